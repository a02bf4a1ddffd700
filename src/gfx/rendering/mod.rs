// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, the GPU copies of instance batches, and frame rendering.

pub mod instanced_renderer;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use instanced_renderer::{GpuBatch, GpuMesh, InstancedRenderer};
pub use pipeline_manager::{PassKind, PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
