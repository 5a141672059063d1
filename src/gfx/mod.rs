//! # Graphics Module
//!
//! Everything between the loaded model file and pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped controls
//! - **Picking** ([`picking`]) - Pointer rays and the clickable region registry
//! - **Labels** ([`label`]) - Text rasterized into RGBA textures
//! - **Geometry** ([`geometry`]) - Procedural meshes such as the label plane
//! - **Model Loading** ([`loader`]) - glTF import off the event-loop thread
//! - **Scene Management** ([`scene`]) - Objects, the label plane and the camera
//! - **Resources** ([`resources`]) - Textures, uniforms and baked lighting
//! - **Rendering Pipeline** ([`rendering`]) - The wgpu render engine
//! - **UI** ([`ui`]) - imgui overlay
//!
//! ## Usage
//!
//! The render engine is created by [`crate::ViewerApp`] once a window exists:
//!
//! ```no_run
//! use sheen_viewer::gfx::RenderEngine;
//! use sheen_viewer::settings::RenderSettings;
//!
//! // let engine = RenderEngine::new(window, width, height, &RenderSettings::default()).await?;
//! ```

pub mod camera;
pub mod geometry;
pub mod label;
pub mod loader;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod ui;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
