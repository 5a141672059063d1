use std::{iter, sync::Arc};

use anyhow::Context;
use wgpu::{RenderPipeline, TextureFormat};

use crate::{
    error::RenderError,
    gfx::{
        label::{Color, MAX_LABEL_DIMENSION},
        resources::{
            update_global_ubo, GlobalBindings, GlobalUBO, GlobalUBOContent, TextureResource,
        },
        scene::{object::DrawObject, Scene, TexturedVertex, Vertex3D},
    },
    settings::RenderSettings,
    wgpu_utils::binding_types,
};

const SCENE_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/scene.wgsl")
);
const LABEL_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/label.wgsl")
);

/// Settings a render pipeline is built from
struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    layouts: &'a [&'a wgpu::BindGroupLayout],
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    sample_count: u32,
    depth_texture: TextureResource,
    msaa_target: Option<TextureResource>,

    mesh_pipeline: RenderPipeline,
    label_pipeline: RenderPipeline,
    mesh_layout: wgpu::BindGroupLayout,
    label_layout: wgpu::BindGroupLayout,

    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    exposure: f32,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        settings: &RenderSettings,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: MAX_LABEL_DIMENSION,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;

        let sample_count = supported_sample_count(&adapter, format, settings.sample_count);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(
            &device,
            config.width,
            config.height,
            sample_count,
            "depth_texture",
        );
        let msaa_target = (sample_count > 1).then(|| {
            TextureResource::create_msaa_target(&device, format, config.width, config.height, sample_count)
        });

        // GLOBAL UNIFORMS - CAMERA AND LIGHTING, NEEDED BY BOTH PIPELINES
        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[binding_types::rendering_entry(0, binding_types::uniform())],
        });
        let label_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Label Bind Group Layout"),
            entries: &[
                binding_types::rendering_entry(0, binding_types::uniform()),
                binding_types::rendering_entry(1, binding_types::texture_2d()),
                binding_types::rendering_entry(
                    2,
                    binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });
        let label_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Label Shader"),
            source: wgpu::ShaderSource::Wgsl(LABEL_SHADER.into()),
        });

        let mesh_pipeline = create_pipeline(
            &device,
            format,
            sample_count,
            PipelineDesc {
                label: "Mesh Pipeline",
                shader: &scene_shader,
                layouts: &[global_bindings.bind_group_layout(), &mesh_layout],
                vertex_layout: Vertex3D::desc(),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );
        let label_pipeline = create_pipeline(
            &device,
            format,
            sample_count,
            PipelineDesc {
                label: "Label Pipeline",
                shader: &label_shader,
                layouts: &[global_bindings.bind_group_layout(), &label_layout],
                vertex_layout: TexturedVertex::desc(),
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        log::info!(
            "Render engine ready: {:?}, {}x{}, {}x MSAA",
            format,
            config.width,
            config.height,
            sample_count
        );

        Ok(RenderEngine {
            surface,
            device: device.into(),
            queue: queue.into(),
            config,
            format,
            sample_count,
            depth_texture,
            msaa_target,
            mesh_pipeline,
            label_pipeline,
            mesh_layout,
            label_layout,
            global_ubo,
            global_bindings,
            exposure: settings.exposure,
        })
    }

    /// Uploads anything new in the scene and refreshes the global uniforms
    fn prepare(&mut self, scene: &mut Scene) {
        for object in scene.objects.iter_mut().filter(|o| !o.is_uploaded()) {
            object.init_gpu_resources(&self.device, &self.mesh_layout);
        }
        if let Some(label) = scene.label_mut().filter(|l| l.gpu_resources.is_none()) {
            label.init_gpu_resources(&self.device, &self.queue, &self.label_layout);
        }

        let content = GlobalUBOContent::new(
            scene.camera_manager.camera.uniform,
            scene.environment,
            self.exposure,
            !self.format.is_srgb(),
        );
        update_global_ubo(&mut self.global_ubo, &self.queue, content);
    }

    fn clear_color(&self, background: Color) -> wgpu::Color {
        let [r, g, b, a] = background.to_f32();
        // An sRGB surface encodes on write, so the clear value must be linear
        let channel = |c: f32| {
            let c = c as f64;
            if !self.format.is_srgb() {
                c
            } else if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        wgpu::Color {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: a as f64,
        }
    }

    /// Renders the scene, then hands the encoder to `ui_callback` to draw on
    /// top of the resolved frame
    pub fn render_frame_with_ui<F>(&mut self, scene: &mut Scene, ui_callback: F) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                // Reconfigure so the next frame can acquire again
                self.surface.configure(&self.device, &self.config);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        self.prepare(scene);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let (view, resolve_target) = match &self.msaa_target {
                Some(msaa) => (&msaa.view, Some(&surface_texture_view)),
                None => (&surface_texture_view, None),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            render_pass.set_pipeline(&self.mesh_pipeline);
            for object in scene.objects.iter() {
                render_pass.draw_object(object);
            }

            // Label last so it blends over the model
            if let Some(gpu) = scene.label().and_then(|l| l.gpu_resources.as_ref()) {
                render_pass.set_pipeline(&self.label_pipeline);
                render_pass.set_bind_group(1, &gpu.bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Zero-sized requests (minimized windows) are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(
            &self.device,
            width,
            height,
            self.sample_count,
            "depth_texture",
        );
        if self.msaa_target.is_some() {
            self.msaa_target = Some(TextureResource::create_msaa_target(
                &self.device,
                self.format,
                width,
                height,
                self.sample_count,
            ));
        }
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Highest sample count not above `requested` that the adapter supports for `format`
fn supported_sample_count(adapter: &wgpu::Adapter, format: TextureFormat, requested: u32) -> u32 {
    let flags = adapter.get_texture_format_features(format).flags;
    let supported = [16, 8, 4, 2]
        .into_iter()
        .filter(|&count| count <= requested)
        .find(|&count| flags.sample_count_supported(count))
        .unwrap_or(1);
    if supported != requested {
        log::warn!("{requested}x MSAA unsupported for {format:?}, using {supported}x");
    }
    supported
}

fn create_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    sample_count: u32,
    desc: PipelineDesc,
) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[desc.vertex_layout],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Model and label are both visible from behind
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}
