// src/lib.rs
//! Flood damage viewer
//!
//! Interactive 3D view of a single-storey building after a hurricane: rooms,
//! walls and fixtures, with toggleable damage layers drawn as instanced
//! batches on top. Built on wgpu and winit.
//!
//! ```no_run
//! use floodview::{data::sample_hospital, FloodViewApp};
//!
//! FloodViewApp::new(sample_hospital())
//!     .on_selection_change(|room| log::info!("selected {:?}", room.map(|r| &r.name)))
//!     .run()
//!     .unwrap();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod gfx;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::FloodViewApp;
pub use config::ViewerConfig;
pub use data::{Dataset, Room};
pub use error::{Result, ViewerError};
