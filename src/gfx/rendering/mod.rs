// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! [`Renderer`] is what the viewer draws through; [`RenderEngine`] is the
//! wgpu backend the window wraps in one.

pub mod render_engine;

use crate::{error::RenderError, gfx::scene::Scene};

// Re-export main types
pub use render_engine::RenderEngine;

/// Something that can present a [`Scene`] at a given output size
pub trait Renderer {
    /// Zero-sized requests keep the previous size
    fn resize(&mut self, width: u32, height: u32);

    fn output_size(&self) -> (u32, u32);

    /// Draws one frame
    fn render(&mut self, scene: &mut Scene) -> Result<(), RenderError>;
}
