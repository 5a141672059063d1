use cgmath::{Matrix4, SquareMatrix, Vector3};
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::wgpu_utils::UniformBuffer;

/// Per-mesh uniform data, must match `MeshUniform` in `scene.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
}

// GPU resources for one mesh: geometry buffers plus its uniform bind group
pub struct MeshGpuResources {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub uniform: UniformBuffer<MeshUniform>,
    pub bind_group: wgpu::BindGroup,
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    index_count: u32,
    pub base_color: [f32; 4],
    pub gpu_resources: Option<MeshGpuResources>, // None until init_gpu_resources called
}

impl Mesh {
    /// Builds a mesh, computing smooth normals when none are supplied
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
        base_color: [f32; 4],
    ) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => Self::calculate_face_normals(&positions, &indices),
        };

        let vertices = positions
            .iter()
            .zip(normals)
            .map(|(&position, normal)| Vertex3D { position, normal })
            .collect();

        Self {
            vertices,
            index_count: indices.len() as u32,
            indices,
            base_color,
            gpu_resources: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Averages the face normals around each vertex
    pub fn calculate_face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }

            let v0 = Vector3::from(positions[i0]);
            let edge1 = Vector3::from(positions[i1]) - v0;
            let edge2 = Vector3::from(positions[i2]) - v0;
            let face_normal = edge1.cross(edge2);

            for vertex_idx in [i0, i1, i2] {
                normals[vertex_idx] += face_normal;
            }
        }

        normals
            .into_iter()
            .map(|n| {
                let length = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
                if length > 0.0 {
                    (n / length).into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect()
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        layout: &wgpu::BindGroupLayout,
        transform: Matrix4<f32>,
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform = UniformBuffer::new_with_data(
            device,
            &MeshUniform {
                model: transform.into(),
                base_color: self.base_color,
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.binding_resource(),
            }],
        });

        self.gpu_resources = Some(MeshGpuResources {
            vertex_buffer,
            index_buffer,
            uniform,
            bind_group,
        });
    }
}

/// A named node of a loaded model with the meshes it carries
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Matrix4<f32>, // cgmath 4x4 transformation matrix
}

impl Object {
    /// Create a new Object with identity transformation
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform: Matrix4::identity(),
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_uploaded(&self) -> bool {
        self.meshes.iter().all(|mesh| mesh.gpu_resources.is_some())
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        let transform = self.transform;
        for mesh in self.meshes.iter_mut().filter(|m| m.gpu_resources.is_none()) {
            mesh.init_gpu_resources(device, layout, transform);
        }
        log::debug!("Uploaded '{}' ({} meshes)", self.name, self.meshes.len());
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let Some(gpu) = &mesh.gpu_resources else {
            return; // Skip drawing if not uploaded
        };

        self.set_bind_group(1, &gpu.bind_group, &[]);
        self.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_object(&mut self, object: &'b Object) {
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            vec![0, 1, 2],
            [1.0; 4],
        )
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = triangle();
        for vertex in mesh.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
        assert_eq!(mesh.index_count(), 3);
    }

    #[test]
    fn test_mismatched_normals_are_replaced() {
        let mesh = Mesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![[1.0, 0.0, 0.0]]),
            vec![0, 1, 2],
            [1.0; 4],
        );
        assert_eq!(mesh.vertices()[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_new_object_waits_for_upload() {
        let object = Object::new("tri", vec![triangle()])
            .with_transform(Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0)));

        assert_eq!(object.transform.w.truncate(), Vector3::new(0.0, 2.0, 0.0));
        assert!(!object.is_uploaded());
        assert!(Object::new("empty", Vec::new()).is_uploaded());
    }
}
