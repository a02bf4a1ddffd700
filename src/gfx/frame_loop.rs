//! Per-frame update loop.
//!
//! [`FrameLoop::tick`] is called once per presented frame with the time since
//! the previous one. Each tick, in order, it recomputes the camera, advances
//! the flood-water opacity animation, steps the exploded-view offsets toward
//! their targets and hands back a [`FrameOutput`] for the renderer.
//!
//! Once [`FrameLoop::stop`] has been called, `tick` is a no-op returning
//! `None`, so a torn-down window never gets another frame.

use serde::Deserialize;

use crate::gfx::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Height between consecutive exploded layers
    pub explode_height: f32,
    /// Fraction of the remaining distance covered per frame
    pub explode_step: f32,
    pub flood_opacity_base: f32,
    pub flood_opacity_amplitude: f32,
    /// Oscillations per second
    pub flood_opacity_frequency: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            explode_height: 4.0,
            explode_step: 0.12,
            flood_opacity_base: 0.35,
            flood_opacity_amplitude: 0.1,
            flood_opacity_frequency: 0.25,
        }
    }
}

impl AnimationConfig {
    pub fn with_explode(mut self, height: f32, step: f32) -> Self {
        self.explode_height = height;
        self.explode_step = step;
        self
    }

    pub fn with_flood_opacity(mut self, base: f32, amplitude: f32, frequency: f32) -> Self {
        self.flood_opacity_base = base;
        self.flood_opacity_amplitude = amplitude;
        self.flood_opacity_frequency = frequency;
        self
    }

    /// Opacity of the flood-water plane at `elapsed` seconds
    pub fn flood_opacity(&self, elapsed: f64) -> f32 {
        let phase = std::f64::consts::TAU * f64::from(self.flood_opacity_frequency) * elapsed;
        (self.flood_opacity_base + self.flood_opacity_amplitude * phase.sin() as f32).clamp(0.0, 1.0)
    }
}

/// What the renderer needs from one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub frame: u64,
    /// Seconds since the loop started
    pub elapsed: f64,
    pub flood_opacity: f32,
    /// An exploded-view transition is still in progress
    pub animating: bool,
}

pub struct FrameLoop {
    config: AnimationConfig,
    elapsed: f64,
    frame: u64,
    running: bool,
    exploded: bool,
}

impl FrameLoop {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            frame: 0,
            running: true,
            exploded: false,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Cancels the loop; later ticks do nothing.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame loop stopped after {} frames", self.frame);
        }
        self.running = false;
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn set_exploded(&mut self, exploded: bool, scene: &mut Scene) {
        self.exploded = exploded;
        scene
            .layers_mut()
            .set_explode_targets(exploded, self.config.explode_height);
    }

    pub fn toggle_exploded(&mut self, scene: &mut Scene) {
        self.set_exploded(!self.exploded, scene);
    }

    /// Advances one frame. Non-finite or negative `dt` counts as zero.
    pub fn tick(&mut self, dt: f64, scene: &mut Scene) -> Option<FrameOutput> {
        if !self.running {
            return None;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += dt;
        self.frame += 1;

        scene.update();
        let flood_opacity = self.config.flood_opacity(self.elapsed);
        let animating = scene.layers_mut().step_offsets(self.config.explode_step);

        Some(FrameOutput {
            frame: self.frame,
            elapsed: self.elapsed,
            flood_opacity,
            animating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_hospital;
    use crate::gfx::camera::{
        CameraController, CameraManager, ControllerConfig, HomeView, OrbitCamera, OrbitCameraBounds,
    };
    use crate::gfx::scene::{DamageLayer, LayerConfig, LayerId};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0);
        let manager = CameraManager::new(camera, CameraController::new(ControllerConfig::default()));
        Scene::new(sample_hospital(), &LayerConfig::default(), manager)
    }

    #[test]
    fn test_stopped_loop_does_not_tick() {
        let mut scene = scene();
        let mut frames = FrameLoop::new(AnimationConfig::default());

        assert!(frames.tick(1.0 / 60.0, &mut scene).is_some());
        frames.stop();
        assert!(frames.tick(1.0 / 60.0, &mut scene).is_none());
        assert!(frames.tick(1.0 / 60.0, &mut scene).is_none());
        assert!(!frames.is_running());
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut scene = scene();
        let mut frames = FrameLoop::new(AnimationConfig::default());

        frames.tick(f64::NAN, &mut scene);
        frames.tick(-3.0, &mut scene);
        frames.tick(f64::INFINITY, &mut scene);
        assert_eq!(frames.elapsed(), 0.0);

        let out = frames.tick(0.5, &mut scene).unwrap();
        assert_eq!(out.frame, 4);
        assert_eq!(out.elapsed, 0.5);
    }

    #[test]
    fn test_flood_opacity_bounded() {
        let config = AnimationConfig::default();
        let low = config.flood_opacity_base - config.flood_opacity_amplitude - 1e-6;
        let high = config.flood_opacity_base + config.flood_opacity_amplitude + 1e-6;

        let mut scene = scene();
        let mut frames = FrameLoop::new(config);
        for _ in 0..600 {
            let out = frames.tick(1.0 / 60.0, &mut scene).unwrap();
            assert!((low..=high).contains(&out.flood_opacity));
        }
    }

    #[test]
    fn test_explode_converges_monotonically() {
        let mut scene = scene();
        let mut frames = FrameLoop::new(AnimationConfig::default());
        frames.set_exploded(true, &mut scene);

        let id = LayerId::Damage(DamageLayer::Ceiling);
        let mut previous = scene.layers().offset(id);
        let mut settled = false;
        for _ in 0..300 {
            let out = frames.tick(1.0 / 60.0, &mut scene).unwrap();
            let offset = scene.layers().offset(id);
            assert!(offset >= previous);
            previous = offset;
            if !out.animating {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(previous, frames.config().explode_height);

        frames.toggle_exploded(&mut scene);
        for _ in 0..300 {
            frames.tick(1.0 / 60.0, &mut scene);
        }
        assert_eq!(scene.layers().offset(id), 0.0);
    }
}
