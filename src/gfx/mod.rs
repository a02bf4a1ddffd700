//! # Graphics Module
//!
//! Everything between the room dataset and the pixels: procedural scene
//! construction, the orbit camera, picking, the frame loop and the wgpu
//! renderer.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - Instance batches, layer groups and selection
//! - **Camera System** ([`camera`]) - Orbit camera with clamped spherical coordinates
//! - **Picking** ([`picking`]) - Screen ray against room volumes, click detection
//! - **Frame Loop** ([`frame_loop`]) - Per-frame animation state, cancellable
//! - **Rendering Pipeline** ([`rendering`]) - One instanced draw per visible batch
//! - **Resource Management** ([`resources`]) - Depth buffer and uniform bindings
//!
//! ## Usage
//!
//! ```no_run
//! use floodview::data::sample_hospital;
//! use floodview::gfx::camera::{CameraController, CameraManager, ControllerConfig, HomeView, OrbitCamera, OrbitCameraBounds};
//! use floodview::gfx::scene::{LayerConfig, Scene};
//!
//! let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 16.0 / 9.0);
//! let manager = CameraManager::new(camera, CameraController::new(ControllerConfig::default()));
//! let scene = Scene::new(sample_hospital(), &LayerConfig::default(), manager);
//! println!("{} visible batches", scene.visible_batches().count());
//! ```

pub mod camera;
pub mod frame_loop;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use frame_loop::{AnimationConfig, FrameLoop, FrameOutput};
pub use rendering::render_engine::RenderEngine;
