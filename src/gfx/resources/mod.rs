// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Depth buffer plus the uniform buffers and bind groups shared by every draw.

pub mod global_bindings;
pub mod depth_buffer;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LayerUniform};
pub use depth_buffer::DepthBuffer;
