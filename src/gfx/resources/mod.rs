// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform bindings and the baked lighting environment.

pub mod environment;
pub mod global_bindings;
pub mod texture_resource;

// Re-export main types
pub use environment::{AmbientCube, RoomEnvironment};
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use texture_resource::TextureResource;
