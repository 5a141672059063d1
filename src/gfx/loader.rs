//! # Model Loading
//!
//! Imports binary glTF (`.glb`) files into scene [`Object`]s.
//!
//! Loading happens off the event loop: [`spawn_load`] reads and decodes the
//! file on a worker thread and hands back a [`PendingModel`], which can be
//! awaited as a future or polled without blocking via
//! [`PendingModel::try_take`]. GPU upload is left to the renderer, so loaded
//! meshes carry CPU data only.

use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use futures::channel::oneshot;

use crate::{
    error::LoadError,
    gfx::scene::object::{Mesh, Object},
};

/// A node of the imported scene graph with its world transform
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Matrix4<f32>,
}

impl ModelNode {
    pub fn world_position(&self) -> Vector3<f32> {
        self.transform.w.truncate()
    }
}

/// Everything imported from one model file
#[derive(Default)]
pub struct LoadedModel {
    /// Nodes that carry geometry
    pub objects: Vec<Object>,
    /// Every node in traversal order, with or without geometry
    pub nodes: Vec<ModelNode>,
}

impl LoadedModel {
    /// Looks up a node by its exact name
    pub fn find_node(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn mesh_count(&self) -> usize {
        self.objects.iter().map(|object| object.meshes.len()).sum()
    }
}

/// Imports the default scene (or the first one) of a glTF file
pub fn load_model(path: &Path) -> Result<LoadedModel, LoadError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| LoadError::Import {
        path: path.to_path_buf(),
        source,
    })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::NoScene(path.to_path_buf()))?;

    let mut model = LoadedModel::default();
    for node in scene.nodes() {
        visit_node(&node, Matrix4::identity(), &buffers, &mut model);
    }

    log::info!(
        "Loaded {} ({} nodes, {} meshes)",
        path.display(),
        model.nodes.len(),
        model.mesh_count()
    );
    Ok(model)
}

fn visit_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut LoadedModel,
) {
    let world = parent * Matrix4::from(node.transform().matrix());
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    if let Some(mesh) = node.mesh() {
        let meshes: Vec<Mesh> = mesh
            .primitives()
            .filter_map(|primitive| read_primitive(&primitive, buffers))
            .collect();
        if !meshes.is_empty() {
            model
                .objects
                .push(Object::new(name.clone(), meshes).with_transform(world));
        }
    }

    model.nodes.push(ModelNode {
        name,
        transform: world,
    });

    for child in node.children() {
        visit_node(&child, world, buffers, model);
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!("Skipping primitive with mode {:?}", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|normals| normals.collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Some(Mesh::new(positions, normals, indices, base_color))
}

/// An in-flight model load
pub struct PendingModel {
    receiver: oneshot::Receiver<Result<LoadedModel, LoadError>>,
}

impl PendingModel {
    /// A load that has already finished with `result`
    pub fn ready(result: Result<LoadedModel, LoadError>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(result);
        Self { receiver }
    }

    /// Returns the result once the load has finished, without blocking
    pub fn try_take(&mut self) -> Option<Result<LoadedModel, LoadError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(LoadError::Canceled)),
        }
    }
}

impl Future for PendingModel {
    type Output = Result<LoadedModel, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(LoadError::Canceled)))
    }
}

/// Starts loading `path` on a worker thread
pub fn spawn_load(path: PathBuf) -> PendingModel {
    let (sender, receiver) = oneshot::channel();
    log::info!("Loading model from {}", path.display());

    let spawned = std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            let _ = sender.send(load_model(&path));
        });
    if let Err(e) = spawned {
        // The sender went down with the closure, so the receiver reports Canceled
        log::error!("Failed to start model loader thread: {e}");
    }

    PendingModel { receiver }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_missing_file_is_an_import_error() {
        let result = block_on(spawn_load(PathBuf::from("does/not/exist.glb")));
        match result {
            Err(LoadError::Import { path, .. }) => {
                assert_eq!(path, PathBuf::from("does/not/exist.glb"))
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading a missing file succeeded"),
        }
    }

    #[test]
    fn test_ready_model_is_taken_once() {
        let mut pending = PendingModel::ready(Ok(LoadedModel::default()));
        assert!(matches!(pending.try_take(), Some(Ok(_))));
        // The channel is spent after the first take
        assert!(matches!(pending.try_take(), Some(Err(LoadError::Canceled))));
    }

    #[test]
    fn test_dropped_loader_reports_canceled() {
        let (sender, receiver) = oneshot::channel();
        drop(sender);
        let pending = PendingModel { receiver };
        assert!(matches!(block_on(pending), Err(LoadError::Canceled)));
    }

    #[test]
    fn test_find_node_by_name() {
        let model = LoadedModel {
            objects: Vec::new(),
            nodes: vec![
                ModelNode {
                    name: "SheenChair_wood".into(),
                    transform: Matrix4::identity(),
                },
                ModelNode {
                    name: "SheenChair_fabric".into(),
                    transform: Matrix4::from_translation(Vector3::new(0.0, 0.4, 0.0)),
                },
            ],
        };

        let node = model.find_node("SheenChair_fabric").unwrap();
        assert_eq!(node.world_position(), Vector3::new(0.0, 0.4, 0.0));
        assert!(model.find_node("sheenchair_fabric").is_none());
    }
}
