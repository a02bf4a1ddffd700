pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::{CameraController, ControllerConfig, DragState, PointerClick};
pub use camera_utils::{Camera, CameraManager, CameraUniform};
pub use orbit_camera::{HomeView, OrbitCamera, OrbitCameraBounds};
