//! Global uniform bindings for camera and lighting data
//!
//! Everything in here is shared by every draw in a frame and bound to slot 0
//! of both the mesh and the label pipelines.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, resources::environment::AmbientCube},
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],  // Camera position (homogeneous coordinates)
    view_proj: [[f32; 4]; 4], // Camera view-projection matrix
    ambient: [[f32; 4]; 6],   // Ambient cube faces, +X -X +Y -Y +Z -Z
    // x: exposure, y: 1.0 when the shader must encode sRGB itself
    params: [f32; 4],
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

impl GlobalUBOContent {
    pub fn new(
        camera: CameraUniform,
        environment: AmbientCube,
        exposure: f32,
        encode_srgb: bool,
    ) -> Self {
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: environment.to_padded(),
            params: [exposure, if encode_srgb { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

/// Writes this frame's camera and lighting state (skipped when unchanged)
pub fn update_global_ubo(ubo: &mut GlobalUBO, queue: &wgpu::Queue, content: GlobalUBOContent) {
    ubo.update_content(queue, content);
}

/// Bind group layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[binding_types::rendering_entry(0, binding_types::uniform())],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
