//! Error types for the viewer.
//!
//! Geometry and dataset problems inside an already-loaded dataset are absorbed
//! by the scene builder and never show up here. What does show up is what the
//! viewer cannot recover from on its own: a missing GPU, a lost surface, or an
//! input file that cannot be read at all.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no suitable GPU adapter is available: {0}")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    #[error("failed to request a GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create the render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("the render surface was lost and could not be reconfigured")]
    SurfaceLost,

    #[error("the GPU ran out of memory while acquiring a frame")]
    SurfaceOutOfMemory,

    #[error("failed to read dataset '{}': {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    DatasetParse(#[from] serde_json::Error),

    #[error("failed to read config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
