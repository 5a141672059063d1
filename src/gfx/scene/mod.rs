//! # Scene Management Module
//!
//! Holds what gets drawn each frame: the objects imported from the model
//! file, the single label plane, the background colour and the baked ambient
//! lighting, together with the camera that views them.
//!
//! ## Key Components
//!
//! - [`Scene`] - The scene container with camera, objects and label
//! - [`Object`] - A named model node with its meshes and world transform
//! - [`LabelPlane`] - A textured quad placed in world space
//! - [`Vertex3D`] - Lit vertex with position and normal
//!
//! GPU buffers are created lazily by the render engine the first time an
//! object or label is drawn.

pub mod label_plane;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use label_plane::LabelPlane;
pub use object::{DrawObject, Mesh, Object};
pub use scene::Scene;
pub use vertex::{TexturedVertex, Vertex3D};
