use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    error::RenderError,
    gfx::{
        loader,
        rendering::{RenderEngine, Renderer},
        scene::Scene,
        ui::{draw_info_overlay, UiManager},
    },
    navigation::HistoryNavigator,
    settings::{OverlaySettings, ViewerSettings},
    viewer::ViewerContext,
};

pub struct ViewerApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    context: ViewerContext,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    overlay: OverlaySettings,
    error: Option<anyhow::Error>,
}

/// The render engine plus the overlay drawn on top of it, for one frame
struct WindowRenderer<'a> {
    engine: &'a mut RenderEngine,
    ui: &'a mut UiManager,
    window: &'a Window,
    overlay: &'a OverlaySettings,
}

impl Renderer for WindowRenderer<'_> {
    fn resize(&mut self, width: u32, height: u32) {
        self.engine.resize(width, height);
    }

    fn output_size(&self) -> (u32, u32) {
        self.engine.get_surface_size()
    }

    fn render(&mut self, scene: &mut Scene) -> Result<(), RenderError> {
        let ui = &mut *self.ui;
        let window = self.window;
        let overlay = self.overlay;
        self.engine
            .render_frame_with_ui(scene, |device, queue, encoder, color_attachment| {
                ui.draw(device, queue, encoder, window, color_attachment, |frame| {
                    draw_info_overlay(frame, overlay)
                });
            })
    }
}

impl ViewerApp {
    pub fn new(settings: ViewerSettings) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                overlay: settings.overlay.clone(),
                context: ViewerContext::new(settings, HistoryNavigator::new()),
                window: None,
                render_engine: None,
                ui_manager: None,
                error: None,
            },
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("Event loop failed")?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_settings = &self.context.settings().window;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(window_settings.title.clone())
                    .with_inner_size(LogicalSize::new(window_settings.width, window_settings.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let PhysicalSize { width, height } = window.inner_size();
        let engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.context.settings().render,
        ))?;

        let ui_manager = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );

        self.context.resize(width, height);
        self.context
            .begin_model_load(loader::spawn_load(self.context.settings().model.path()));

        self.window = Some(window);
        self.render_engine = Some(engine);
        self.ui_manager = Some(ui_manager);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Failed to start viewer: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(render_engine), Some(ui_manager)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return;
        };

        // imgui sees input first
        let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        let ui_captured = ui_manager.handle_input(window, &ui_event);

        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    state: ElementState::Pressed,
                    ..
                } = key_event
                {
                    event_loop.exit();
                }
                self.context
                    .scene
                    .camera_manager
                    .process_keyboard_event(&key_event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.context.resize(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.context.pointer_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } if !ui_captured => {
                if let Some(hit) = self.context.click() {
                    log::debug!("Label clicked at {:?}", hit.point);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let mut renderer = WindowRenderer {
                    engine: render_engine,
                    ui: ui_manager,
                    window,
                    overlay: &self.overlay,
                };
                if let Err(e) = self.context.frame(&mut renderer) {
                    log::warn!("Frame skipped: {e}");
                }
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.window.is_none() {
            return;
        }

        // Don't drive the camera while imgui is using the mouse
        if self.ui_manager.as_ref().is_some_and(UiManager::wants_input) {
            return;
        }

        self.context.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.context.poll_model_load();

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
