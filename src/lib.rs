// src/lib.rs
//! Sheen Viewer
//!
//! Loads a glTF model into a wgpu scene, pins a clickable text label to it and
//! renders it under an orbit camera with a fixed informational overlay.
//!
//! ```no_run
//! use sheen_viewer::{ViewerApp, ViewerSettings};
//!
//! let app = ViewerApp::new(ViewerSettings::default())?;
//! app.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod error;
pub mod gfx;
pub mod navigation;
pub mod settings;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use settings::ViewerSettings;
pub use viewer::{ModelState, ViewerContext};
