//! A flat textured quad placed in world space, used for the clickable label.

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    gfx::{
        geometry::primitives::plane_geometry, label::LabelTexture, picking::Quad,
        resources::TextureResource,
    },
    wgpu_utils::UniformBuffer,
};

/// Per-label uniform data, must match `LabelUniform` in `label.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LabelUniform {
    pub model: [[f32; 4]; 4],
}

pub struct LabelGpuResources {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub texture: TextureResource,
    pub uniform: UniformBuffer<LabelUniform>,
    pub bind_group: wgpu::BindGroup,
}

pub struct LabelPlane {
    texture: LabelTexture,
    width: f32,
    height: f32,
    transform: Matrix4<f32>,
    pub gpu_resources: Option<LabelGpuResources>,
}

impl LabelPlane {
    /// Plane of `width` x `height` world units centred at `position`,
    /// facing +Z with no rotation
    pub fn new(texture: LabelTexture, width: f32, height: f32, position: Vector3<f32>) -> Self {
        Self {
            texture,
            width,
            height,
            transform: Matrix4::from_translation(position),
            gpu_resources: None,
        }
    }

    pub fn texture(&self) -> &LabelTexture {
        &self.texture
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.w.truncate()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// The plane's world-space rectangle for hit testing
    pub fn world_quad(&self) -> Quad {
        Quad::from_transform(&self.transform, self.width, self.height)
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) {
        let geometry = plane_geometry(self.width, self.height);
        let (vertex_count, triangles) = (geometry.vertex_count(), geometry.triangle_count());
        let (vertices, indices) = geometry.to_textured_format();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Label Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Label Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let texture = TextureResource::create_from_rgba_data(
            device,
            queue,
            self.texture.pixels(),
            (self.texture.width(), self.texture.height()),
            wgpu::FilterMode::Linear,
            "Label Texture",
        );

        let uniform = UniformBuffer::new_with_data(
            device,
            &LabelUniform {
                model: self.transform.into(),
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Label Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        log::debug!(
            "Uploaded label texture {}x{} on {} vertices, {} triangles",
            self.texture.width(),
            self.texture.height(),
            vertex_count,
            triangles
        );

        self.gpu_resources = Some(LabelGpuResources {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            texture,
            uniform,
            bind_group,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::label::{create_text_texture, LabelStyle};

    #[test]
    fn test_world_quad_matches_placement() {
        let style = LabelStyle::parse("10px", 5, "transparent", "black").unwrap();
        let plane = LabelPlane::new(
            create_text_texture("About Me", &style).unwrap(),
            0.3,
            0.1,
            Vector3::new(0.0, 0.555, -0.26),
        );

        let quad = plane.world_quad();
        assert_eq!(quad.center, Vector3::new(0.0, 0.555, -0.26));
        assert!((quad.half_width - 0.15).abs() < 1e-6);
        assert!((quad.half_height - 0.05).abs() < 1e-6);
        assert_eq!(quad.normal(), Vector3::unit_z());
        assert_eq!(plane.position(), quad.center);
        assert!(plane.gpu_resources.is_none());
    }
}
