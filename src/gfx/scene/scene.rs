use crate::{
    error::AttachError,
    gfx::{
        camera::camera_utils::CameraManager,
        label::Color,
        loader::{LoadedModel, ModelNode},
        resources::environment::AmbientCube,
    },
};

use super::{label_plane::LabelPlane, object::Object};

/// Main scene containing the loaded model, its label and the camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub background: Color,
    pub environment: AmbientCube,
    nodes: Vec<ModelNode>,
    label: Option<LabelPlane>,
}

impl Scene {
    /// Creates an empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            background: Color::WHITE,
            environment: AmbientCube::uniform(1.0),
            nodes: Vec::new(),
            label: None,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_environment(mut self, environment: AmbientCube) -> Self {
        self.environment = environment;
        self
    }

    /// Steps the camera controls and refreshes camera matrices.
    /// Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        self.camera_manager.update()
    }

    /// Moves a loaded model's objects and node table into the scene
    pub fn add_model(&mut self, model: LoadedModel) {
        self.objects.extend(model.objects);
        self.nodes.extend(model.nodes);
    }

    /// Looks up a node of any model added so far
    pub fn find_node(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Adds the label plane; a scene holds at most one
    pub fn set_label(&mut self, label: LabelPlane) -> Result<(), AttachError> {
        if self.label.is_some() {
            return Err(AttachError::AlreadyAttached);
        }
        self.label = Some(label);
        Ok(())
    }

    pub fn label(&self) -> Option<&LabelPlane> {
        self.label.as_ref()
    }

    pub fn label_mut(&mut self) -> Option<&mut LabelPlane> {
        self.label.as_mut()
    }

    /// Number of objects currently in the scene
    pub fn get_object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn get_object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|object| object.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::label::{create_text_texture, LabelStyle},
        settings::{CameraSettings, ControlSettings},
    };
    use cgmath::{Matrix4, SquareMatrix, Vector3};

    fn scene() -> Scene {
        Scene::new(CameraManager::from_settings(
            &CameraSettings::default(),
            &ControlSettings::default(),
            1.5,
        ))
    }

    fn label() -> LabelPlane {
        let style = LabelStyle::parse("10px", 5, "transparent", "black").unwrap();
        LabelPlane::new(create_text_texture("Hi", &style).unwrap(), 0.3, 0.1, Vector3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn test_second_label_is_refused() {
        let mut scene = scene();
        assert!(scene.label().is_none());

        scene.set_label(label()).unwrap();
        assert!(matches!(scene.set_label(label()), Err(AttachError::AlreadyAttached)));
        assert!(scene.label().is_some());
    }

    #[test]
    fn test_added_model_nodes_are_searchable() {
        let mut scene = scene();
        scene.add_model(LoadedModel {
            objects: vec![Object::new("SheenChair_fabric", Vec::new())],
            nodes: vec![ModelNode {
                name: "SheenChair_fabric".into(),
                transform: Matrix4::identity(),
            }],
        });

        assert_eq!(scene.get_object_count(), 1);
        assert_eq!(scene.get_object_names(), vec!["SheenChair_fabric"]);
        assert!(scene.find_node("SheenChair_fabric").is_some());
        assert!(scene.find_node("SheenChair_wood").is_none());
    }
}
