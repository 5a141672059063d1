//! # Procedural Geometry Generation
//!
//! Generates the flat rectangle the text label is drawn on, so the label
//! needs no model file of its own.
//!
//! ## Usage
//!
//! ```rust
//! use sheen_viewer::gfx::geometry::plane_geometry;
//!
//! // A 0.3 x 0.1 plane facing +Z
//! let plane = plane_geometry(0.3, 0.1);
//! assert_eq!(plane.triangle_count(), 2);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::TexturedVertex;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unlit textured vertex format used for labels
    pub fn to_textured_format(&self) -> (Vec<TexturedVertex>, Vec<u32>) {
        let vertices = (0..self.vertices.len())
            .map(|i| TexturedVertex {
                position: self.vertices[i],
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
