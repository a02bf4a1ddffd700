//! Viewer configuration
//!
//! Everything tunable in one [`ViewerConfig`]. Every section derives
//! `Deserialize` with `#[serde(default)]`, so a config file only needs the
//! values it changes:
//!
//! ```json
//! { "controller": { "click_threshold": 8.0 }, "animation": { "explode_height": 6.0 } }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::data::BuildingConstants;
use crate::error::{Result, ViewerError};
use crate::gfx::{
    camera::{CameraController, CameraManager, ControllerConfig, HomeView, OrbitCamera, OrbitCameraBounds},
    frame_loop::AnimationConfig,
    scene::layers::LayerConfig,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flood Damage Viewer".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub layers: LayerConfig,
    pub home: HomeView,
    pub bounds: OrbitCameraBounds,
    pub controller: ControllerConfig,
    pub animation: AnimationConfig,
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ViewerError::ConfigParse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ViewerError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded viewer config '{}'", path.display());
        Ok(config)
    }

    pub fn with_layers(mut self, layers: LayerConfig) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    /// Camera and controller for a building, homed on the building centre
    pub fn camera_manager(&self, building: &BuildingConstants, aspect: f32) -> CameraManager {
        let home = self.home.with_target(building.center());
        let camera = OrbitCamera::new(home, self.bounds, aspect);
        CameraManager::new(camera, CameraController::new(self.controller))
    }
}
