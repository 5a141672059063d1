//! # Viewer Context
//!
//! [`ViewerContext`] is the one place the viewer's mutable state lives: the
//! scene and its camera, the pointer, the clickable regions, the model load
//! and the navigator. The window application owns one and forwards events to
//! it; tests drive it directly with fake renderers and navigators.
//!
//! ## Lifecycle
//!
//! 1. [`ViewerContext::new`] builds the camera, controls, environment and an
//!    empty scene.
//! 2. [`ViewerContext::begin_model_load`] takes an in-flight load.
//! 3. [`ViewerContext::poll_model_load`] is called once per event-loop turn;
//!    when the load finishes it runs the continuation exactly once: the model
//!    is added, the label is created and its click region registered.
//! 4. [`ViewerContext::frame`] steps the controls and draws, every frame.
//!
//! Clicks that arrive before step 3 find nothing registered and do nothing.

use crate::{
    error::{AttachError, LoadError, RenderError},
    gfx::{
        camera::camera_utils::CameraManager,
        label::{create_text_texture, Color, LabelStyle},
        loader::{LoadedModel, PendingModel},
        picking::{ndc_to_ray, ClickRegistry, ClickShape, PickHit, PointerState},
        rendering::Renderer,
        resources::environment::RoomEnvironment,
        scene::{LabelPlane, Scene},
    },
    navigation::Navigator,
    settings::ViewerSettings,
};

/// Where the model load stands
#[derive(Debug)]
pub enum ModelState {
    /// No load started yet
    Idle,
    Loading,
    /// Model and label are in the scene
    Loaded { anchor_found: bool },
    /// Load or attachment failed; the scene stays camera-only
    Failed(AttachError),
}

pub struct ViewerContext {
    settings: ViewerSettings,
    pub scene: Scene,
    pointer: PointerState,
    registry: ClickRegistry,
    navigator: Box<dyn Navigator>,
    model_state: ModelState,
    pending: Option<PendingModel>,
    viewport: (u32, u32),
    frames_rendered: u64,
}

impl ViewerContext {
    pub fn new(settings: ViewerSettings, navigator: impl Navigator + 'static) -> Self {
        let viewport = (settings.window.width.max(1), settings.window.height.max(1));
        let aspect = viewport.0 as f32 / viewport.1 as f32;

        let camera_manager = CameraManager::from_settings(&settings.camera, &settings.controls, aspect);
        let scene = Scene::new(camera_manager)
            .with_background(Color::from_hex(settings.render.background))
            .with_environment(RoomEnvironment::default().ambient_cube());

        Self {
            settings,
            scene,
            pointer: PointerState::default(),
            registry: ClickRegistry::new(),
            navigator: Box::new(navigator),
            model_state: ModelState::Idle,
            pending: None,
            viewport,
            frames_rendered: 0,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model_state
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// True once the label and its click region exist
    pub fn is_armed(&self) -> bool {
        self.scene.label().is_some() && !self.registry.is_empty()
    }

    /// Takes ownership of an in-flight load. Only the first load is accepted.
    pub fn begin_model_load(&mut self, pending: PendingModel) {
        if !matches!(self.model_state, ModelState::Idle) {
            log::warn!("Model load already started, ignoring another");
            return;
        }
        self.pending = Some(pending);
        self.model_state = ModelState::Loading;
    }

    /// Finishes the load if its result has arrived. Returns whether it did.
    pub fn poll_model_load(&mut self) -> bool {
        let Some(result) = self.pending.as_mut().and_then(PendingModel::try_take) else {
            return false;
        };
        self.pending = None;
        self.complete_model_load(result);
        true
    }

    /// The load continuation: attaches the model, or records why it could not
    pub fn complete_model_load(&mut self, result: Result<LoadedModel, LoadError>) {
        match result.map_err(AttachError::from).and_then(|model| self.attach_model(model)) {
            Ok(()) => {}
            Err(AttachError::AlreadyAttached) => {
                log::warn!("Model load completed twice, keeping the first");
            }
            Err(e) => {
                log::error!("Model not attached: {e}");
                if let Some(source) = std::error::Error::source(&e) {
                    log::error!("  caused by: {source}");
                }
                self.model_state = ModelState::Failed(e);
            }
        }
    }

    /// Adds the model to the scene and arms the label.
    ///
    /// Runs at most once; later calls return [`AttachError::AlreadyAttached`]
    /// without touching the scene. The label is built before anything is
    /// added, so a bad label configuration leaves the scene unchanged.
    pub fn attach_model(&mut self, model: LoadedModel) -> Result<(), AttachError> {
        if self.scene.label().is_some() || !self.registry.is_empty() {
            return Err(AttachError::AlreadyAttached);
        }

        let label = &self.settings.label;
        let style = LabelStyle::parse(&label.font, label.padding, &label.background, &label.text_color)?;
        let plane = LabelPlane::new(
            create_text_texture(&label.text, &style)?,
            label.width,
            label.height,
            label.position,
        );
        let quad = plane.world_quad();

        let anchor = &self.settings.model.anchor_node;
        let anchor_found = match model.find_node(anchor) {
            Some(node) => {
                log::debug!("Anchor '{anchor}' at {:?}", node.world_position());
                true
            }
            None => {
                log::warn!("Anchor node '{anchor}' not found in model");
                false
            }
        };

        self.scene.add_model(model);
        self.scene.set_label(plane)?;

        let target = self.settings.navigation.target.clone();
        self.registry
            .register("label", ClickShape::Quad(quad), move |_hit, navigator| {
                navigator.navigate(&target)
            });

        log::info!(
            "Model attached with {} objects, label armed",
            self.scene.get_object_count()
        );
        log::debug!("Scene objects: {:?}", self.scene.get_object_names());
        self.model_state = ModelState::Loaded { anchor_found };
        Ok(())
    }

    /// New viewport size in physical pixels; zero dimensions are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized resize {width}x{height}");
            return;
        }
        self.viewport = (width, height);

        let camera = &mut self.scene.camera_manager.camera;
        camera.resize_projection(width, height);
        camera.update_view_proj();
    }

    /// Pointer moved to `(x, y)` window pixels
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.update((x, y), self.viewport_f32());
    }

    /// Clicks at the last pointer position. Returns the hit, if any region was hit.
    pub fn click(&mut self) -> Option<PickHit> {
        if self.registry.is_empty() {
            return None;
        }

        let position = (self.pointer.position.x, self.pointer.position.y);
        self.pointer.update(position, self.viewport_f32());

        let ray = ndc_to_ray(self.pointer.ndc, &self.scene.camera_manager.camera);
        self.registry.dispatch(&ray, self.navigator.as_mut())
    }

    /// One render-loop iteration: advance the controls, then draw once
    pub fn frame(&mut self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        self.scene.update();
        self.frames_rendered += 1;
        renderer.render(&mut self.scene)
    }

    fn viewport_f32(&self) -> (f32, f32) {
        (self.viewport.0 as f32, self.viewport.1 as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LabelError,
        gfx::{loader::ModelNode, picking::world_to_ndc},
        navigation::HistoryNavigator,
    };
    use cgmath::{Matrix4, SquareMatrix};

    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
        size: (u32, u32),
    }

    impl Renderer for CountingRenderer {
        fn resize(&mut self, width: u32, height: u32) {
            if width > 0 && height > 0 {
                self.size = (width, height);
            }
        }

        fn output_size(&self) -> (u32, u32) {
            self.size
        }

        fn render(&mut self, _scene: &mut Scene) -> Result<(), RenderError> {
            self.renders += 1;
            Ok(())
        }
    }

    fn viewer() -> ViewerContext {
        ViewerContext::new(ViewerSettings::default(), HistoryNavigator::new())
    }

    fn chair() -> LoadedModel {
        LoadedModel {
            objects: Vec::new(),
            nodes: vec![ModelNode {
                name: "SheenChair_fabric".into(),
                transform: Matrix4::identity(),
            }],
        }
    }

    /// Window pixels of the label centre as seen by the current camera
    fn label_center_pixels(viewer: &ViewerContext) -> (f32, f32) {
        let center = viewer.scene.label().unwrap().position();
        let ndc = world_to_ndc(center, &viewer.scene.camera_manager.camera);
        let (w, h) = viewer.viewport();
        ((ndc.x + 1.0) * 0.5 * w as f32, (1.0 - ndc.y) * 0.5 * h as f32)
    }

    #[test]
    fn test_click_before_load_is_a_no_op() {
        let mut viewer = viewer();
        viewer.pointer_moved(600.0, 400.0);

        assert!(viewer.click().is_none());
        assert_eq!(viewer.navigator().current(), None);
        assert!(!viewer.is_armed());
    }

    #[test]
    fn test_label_center_hits_and_corner_misses() {
        let mut viewer = viewer();
        viewer.attach_model(chair()).unwrap();
        assert!(viewer.is_armed());

        // (-1, -1) in NDC is the bottom-left pixel corner
        viewer.pointer_moved(0.0, 800.0);
        assert!(viewer.click().is_none());
        assert_eq!(viewer.navigator().current(), None);

        let (x, y) = label_center_pixels(&viewer);
        viewer.pointer_moved(x, y);
        let hit = viewer.click().expect("label centre should be hit");
        assert!(hit.distance > 0.0);
        assert_eq!(viewer.navigator().current(), Some("/"));
    }

    #[test]
    fn test_click_uses_latest_viewport() {
        let mut viewer = viewer();
        viewer.attach_model(chair()).unwrap();

        viewer.resize(600, 400);
        let (x, y) = label_center_pixels(&viewer);
        viewer.pointer_moved(x, y);
        assert!(viewer.click().is_some());
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut viewer = viewer();
        let mut renderer = CountingRenderer::default();

        viewer.resize(1024, 768);
        renderer.resize(1024, 768);
        let aspect = viewer.scene.camera_manager.camera.aspect;
        let size = renderer.output_size();

        viewer.resize(1024, 768);
        renderer.resize(1024, 768);
        assert_eq!(viewer.scene.camera_manager.camera.aspect, aspect);
        assert_eq!(renderer.output_size(), size);
        assert_eq!(viewer.viewport(), (1024, 768));
    }

    #[test]
    fn test_zero_resize_keeps_previous_aspect() {
        let mut viewer = viewer();
        viewer.resize(1000, 500);

        viewer.resize(0, 500);
        viewer.resize(1000, 0);
        assert_eq!(viewer.scene.camera_manager.camera.aspect, 2.0);
        assert_eq!(viewer.viewport(), (1000, 500));
    }

    #[test]
    fn test_each_frame_draws_exactly_once() {
        let mut viewer = viewer();
        let mut renderer = CountingRenderer::default();

        for n in 1..=5 {
            viewer.frame(&mut renderer).unwrap();
            assert_eq!(renderer.renders, n);
            assert_eq!(viewer.frames_rendered(), n as u64);
        }
    }

    #[test]
    fn test_frames_advance_damped_controls() {
        let mut viewer = viewer();
        let mut renderer = CountingRenderer::default();
        viewer.scene.camera_manager.controller.rotate(0.4, 0.0);

        let mut eye = viewer.scene.camera_manager.camera.eye;
        for _ in 0..3 {
            viewer.frame(&mut renderer).unwrap();
            let next = viewer.scene.camera_manager.camera.eye;
            assert_ne!(next, eye);
            eye = next;
        }
    }

    #[test]
    fn test_second_attach_is_refused() {
        let mut viewer = viewer();
        viewer.attach_model(chair()).unwrap();

        assert!(matches!(viewer.attach_model(chair()), Err(AttachError::AlreadyAttached)));
        assert_eq!(viewer.registry.len(), 1);
        assert!(viewer.scene.label().is_some());
        assert!(matches!(viewer.model_state(), ModelState::Loaded { anchor_found: true }));

        // A repeated completion is ignored the same way
        viewer.complete_model_load(Ok(chair()));
        assert_eq!(viewer.registry.len(), 1);
        assert!(matches!(viewer.model_state(), ModelState::Loaded { .. }));
    }

    #[test]
    fn test_pending_load_completes_once() {
        let mut viewer = viewer();
        assert!(!viewer.poll_model_load());

        viewer.begin_model_load(PendingModel::ready(Ok(chair())));
        assert!(matches!(viewer.model_state(), ModelState::Loading));

        // Ignored: only one load per session
        viewer.begin_model_load(PendingModel::ready(Ok(chair())));

        assert!(viewer.poll_model_load());
        assert!(viewer.is_armed());
        assert!(!viewer.poll_model_load());
    }

    #[test]
    fn test_failed_load_leaves_camera_only_scene() {
        let mut viewer = viewer();
        viewer.begin_model_load(PendingModel::ready(Err(LoadError::NoScene("chair.glb".into()))));

        assert!(viewer.poll_model_load());
        assert!(matches!(
            viewer.model_state(),
            ModelState::Failed(AttachError::Load(LoadError::NoScene(_)))
        ));
        assert!(!viewer.is_armed());
        assert_eq!(viewer.scene.get_object_count(), 0);

        viewer.pointer_moved(600.0, 400.0);
        assert!(viewer.click().is_none());
    }

    #[test]
    fn test_bad_font_unit_fails_attachment() {
        let mut settings = ViewerSettings::default();
        settings.label.font = "10".into();
        let mut viewer = ViewerContext::new(settings, HistoryNavigator::new());

        viewer.complete_model_load(Ok(chair()));
        assert!(matches!(
            viewer.model_state(),
            ModelState::Failed(AttachError::Label(_))
        ));
        assert!(viewer.scene.label().is_none());
        assert_eq!(viewer.scene.find_node("SheenChair_fabric"), None);
    }

    #[test]
    fn test_oversized_label_fails_attachment() {
        let mut settings = ViewerSettings::default();
        settings.label.text = "x".repeat(500);
        let mut viewer = ViewerContext::new(settings, HistoryNavigator::new());

        viewer.complete_model_load(Ok(chair()));
        assert!(matches!(
            viewer.model_state(),
            ModelState::Failed(AttachError::Label(LabelError::TooLarge { .. }))
        ));
        assert!(!viewer.is_armed());
        assert_eq!(viewer.scene.get_object_count(), 0);
    }

    #[test]
    fn test_missing_anchor_still_attaches() {
        let mut viewer = viewer();
        viewer.attach_model(LoadedModel::default()).unwrap();

        assert!(viewer.is_armed());
        assert!(matches!(viewer.model_state(), ModelState::Loaded { anchor_found: false }));
    }
}
