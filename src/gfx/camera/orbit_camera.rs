use cgmath::*;
use serde::Deserialize;

use super::camera_utils::{Camera, CameraUniform};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Smallest allowed distance between the polar angle and either pole
pub const POLE_MARGIN: f32 = 0.1;

/// Orbit camera around a look-at target, stored as spherical coordinates.
///
/// `polar` is measured from +Y (straight down onto the floor plan at 0) and
/// `azimuth` rotates around +Y starting at +Z. Every update method returns a
/// new value so interaction logic can be exercised without a window.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub home: HomeView,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(home: HomeView, bounds: OrbitCameraBounds, aspect: f32) -> Self {
        let bounds = bounds.sanitized();
        let mut camera = Self {
            radius: bounds.clamp_radius(home.radius),
            polar: bounds.clamp_polar(home.polar),
            azimuth: bounds.clamp_azimuth(home.azimuth),
            eye: Vector3::zero(), // Filled in by `update()` below
            target: home.target,
            up: Vector3::unit_y(),
            bounds,
            home,
            aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
            fovy: cgmath::Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Rotates by a pointer delta in pixels. Dragging right turns the view
    /// left around the target; dragging up tilts toward the horizon.
    pub fn apply_drag(mut self, delta: (f32, f32), rotate_speed: f32) -> Self {
        let (dx, dy) = delta;
        let d_azimuth = dx * rotate_speed;
        let d_polar = dy * rotate_speed;
        if !(d_azimuth.is_finite() && d_polar.is_finite()) {
            return self;
        }
        let azimuth = self.bounds.clamp_azimuth(self.azimuth - d_azimuth);
        let polar = self.bounds.clamp_polar(self.polar - d_polar);
        if !(azimuth.is_finite() && polar.is_finite()) {
            return self;
        }
        self.azimuth = azimuth;
        self.polar = polar;
        self.update();
        self
    }

    /// Scales the radius by `1 + delta_y * zoom_speed`. Positive deltas move away.
    pub fn apply_zoom(mut self, delta_y: f32, zoom_speed: f32) -> Self {
        let factor = 1.0 + delta_y * zoom_speed;
        if !factor.is_finite() {
            return self;
        }
        self.radius = self.bounds.clamp_radius(self.radius * factor.max(MIN_ZOOM_FACTOR));
        self.update();
        self
    }

    /// Moves the look-at target without touching the angles.
    pub fn focus_on(mut self, target: Vector3<f32>, snap_radius: Option<f32>) -> Self {
        if !(target.x.is_finite() && target.y.is_finite() && target.z.is_finite()) {
            return self;
        }
        self.target = target;
        if let Some(radius) = snap_radius.filter(|r| r.is_finite()) {
            self.radius = self.bounds.clamp_radius(radius);
        }
        self.update();
        self
    }

    /// Back to the home radius, angles and target.
    pub fn reset(self) -> Self {
        let home = self.home;
        let bounds = self.bounds;
        Self {
            radius: bounds.clamp_radius(home.radius),
            polar: bounds.clamp_polar(home.polar),
            azimuth: bounds.clamp_azimuth(home.azimuth),
            target: home.target,
            ..self
        }
        .updated()
    }

    fn updated(mut self) -> Self {
        self.update();
        self
    }

    /// Recomputes `eye` from the spherical coordinates.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.polar, self.azimuth, self.radius, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.update();
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}

const MIN_ZOOM_FACTOR: f32 = 0.05;

/// The view the camera starts in and returns to on reset.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomeView {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
    #[serde(skip)]
    pub target: Vector3<f32>,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            radius: 70.0,
            polar: 0.9,
            azimuth: std::f32::consts::FRAC_PI_4,
            target: Vector3::zero(),
        }
    }
}

impl HomeView {
    pub fn with_target(mut self, target: Vector3<f32>) -> Self {
        self.target = target;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitCameraBounds {
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Half-width of the allowed azimuth window around `default_azimuth`;
    /// `None` allows full rotation
    pub azimuth_window: Option<f32>,
    pub default_azimuth: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_radius: 5.0,
            max_radius: 200.0,
            min_polar: 0.1,
            max_polar: std::f32::consts::FRAC_PI_2 - 0.05,
            azimuth_window: None,
            default_azimuth: std::f32::consts::FRAC_PI_4,
        }
    }
}

impl OrbitCameraBounds {
    pub fn with_radius(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    pub fn with_polar(mut self, min: f32, max: f32) -> Self {
        self.min_polar = min;
        self.max_polar = max;
        self
    }

    pub fn with_azimuth_window(mut self, default_azimuth: f32, half_width: f32) -> Self {
        self.default_azimuth = default_azimuth;
        self.azimuth_window = Some(half_width);
        self
    }

    /// Orders the limits and keeps the polar range off the poles.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };

        let mut min_radius = finite_or(self.min_radius, defaults.min_radius).max(f32::EPSILON);
        let mut max_radius = finite_or(self.max_radius, defaults.max_radius).max(f32::EPSILON);
        if min_radius > max_radius {
            std::mem::swap(&mut min_radius, &mut max_radius);
        }

        let pole_limit = std::f32::consts::PI - POLE_MARGIN;
        let mut min_polar = finite_or(self.min_polar, defaults.min_polar).clamp(POLE_MARGIN, pole_limit);
        let mut max_polar = finite_or(self.max_polar, defaults.max_polar).clamp(POLE_MARGIN, pole_limit);
        if min_polar > max_polar {
            std::mem::swap(&mut min_polar, &mut max_polar);
        }

        Self {
            min_radius,
            max_radius,
            min_polar,
            max_polar,
            azimuth_window: self
                .azimuth_window
                .filter(|w| w.is_finite())
                .map(f32::abs),
            default_azimuth: finite_or(self.default_azimuth, defaults.default_azimuth),
        }
    }

    pub fn clamp_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.min_radius, self.max_radius)
    }

    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(self.min_polar, self.max_polar)
    }

    pub fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        match self.azimuth_window {
            Some(window) => azimuth.clamp(
                self.default_azimuth - window,
                self.default_azimuth + window,
            ),
            None => azimuth.rem_euclid(std::f32::consts::TAU),
        }
    }
}

fn calculate_cartesian_eye_position(
    polar: f32,
    azimuth: f32,
    radius: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        radius * polar.sin() * azimuth.sin(),
        radius * polar.cos(),
        radius * polar.sin() * azimuth.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_eye_from_spherical() {
        let home = HomeView {
            radius: 10.0,
            polar: std::f32::consts::FRAC_PI_2 - 0.05,
            azimuth: 0.0,
            target: Vector3::new(1.0, 0.0, 2.0),
        };
        let cam = OrbitCamera::new(home, OrbitCameraBounds::default(), 1.0);

        let p = home.polar;
        assert_relative_eq!(cam.eye.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(cam.eye.y, 10.0 * p.cos(), epsilon = 1e-5);
        assert_relative_eq!(cam.eye.z, 2.0 + 10.0 * p.sin(), epsilon = 1e-5);
    }

    #[test]
    fn test_drag_direction() {
        let cam = camera();
        let dragged = cam.apply_drag((10.0, 0.0), 0.01);
        assert_relative_eq!(dragged.azimuth, cam.azimuth - 0.1, epsilon = 1e-6);

        let tilted = cam.apply_drag((0.0, 10.0), 0.01);
        assert_relative_eq!(tilted.polar, cam.polar - 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_clamped() {
        let cam = camera().apply_drag((0.0, 1e6), 0.005);
        assert_eq!(cam.polar, cam.bounds.min_polar);

        let cam = cam.apply_drag((0.0, -1e6), 0.005);
        assert_eq!(cam.polar, cam.bounds.max_polar);
    }

    #[test]
    fn test_azimuth_window() {
        let bounds = OrbitCameraBounds::default().with_azimuth_window(0.5, 1.0);
        let cam = OrbitCamera::new(HomeView::default(), bounds, 1.0);

        assert_eq!(cam.apply_drag((-1e5, 0.0), 0.01).azimuth, 1.5);
        assert_eq!(cam.apply_drag((1e5, 0.0), 0.01).azimuth, -0.5);
    }

    #[test]
    fn test_zoom_is_multiplicative() {
        let cam = camera();
        let zoomed = cam.apply_zoom(100.0, 0.001);
        assert_relative_eq!(zoomed.radius, cam.radius * 1.1, epsilon = 1e-4);

        assert_eq!(cam.apply_zoom(1e9, 0.001).radius, cam.bounds.max_radius);
        assert_eq!(cam.apply_zoom(-1e9, 0.001).radius, cam.bounds.min_radius);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let cam = camera();
        let after = cam
            .apply_drag((f32::NAN, 1.0), 0.005)
            .apply_drag((1.0, f32::INFINITY), 0.005)
            .apply_zoom(f32::NAN, 0.001)
            .focus_on(Vector3::new(f32::NAN, 0.0, 0.0), None);

        assert_eq!(after.radius, cam.radius);
        assert_eq!(after.polar, cam.polar);
        assert_eq!(after.azimuth, cam.azimuth);
        assert_eq!(after.target, cam.target);
    }

    #[test]
    fn test_overflowing_drag_ignored() {
        let cam = camera();
        let after = cam.apply_drag((1e30, 0.0), 1e10).apply_drag((0.0, -1e30), 1e10);

        assert_eq!(after.azimuth, cam.azimuth);
        assert_eq!(after.polar, cam.polar);
        assert!(after.eye.x.is_finite() && after.eye.y.is_finite() && after.eye.z.is_finite());
    }

    #[test]
    fn test_focus_keeps_angles() {
        let cam = camera().apply_drag((40.0, -15.0), 0.005);
        let focused = cam.focus_on(Vector3::new(12.0, 1.5, -8.0), Some(20.0));

        assert_eq!(focused.polar, cam.polar);
        assert_eq!(focused.azimuth, cam.azimuth);
        assert_eq!(focused.radius, 20.0);
        assert_eq!(focused.target, Vector3::new(12.0, 1.5, -8.0));
    }

    #[test]
    fn test_reset_returns_home() {
        let cam = camera()
            .apply_drag((300.0, 50.0), 0.005)
            .apply_zoom(-400.0, 0.001)
            .focus_on(Vector3::new(5.0, 0.0, 5.0), None);
        let home = cam.reset();
        let fresh = camera();

        assert_eq!(home.radius, fresh.radius);
        assert_eq!(home.polar, fresh.polar);
        assert_eq!(home.azimuth, fresh.azimuth);
        assert_eq!(home.eye, fresh.eye);
    }

    #[test]
    fn test_bounds_sanitized() {
        let bounds = OrbitCameraBounds::default()
            .with_radius(100.0, 10.0)
            .with_polar(0.0, std::f32::consts::PI)
            .sanitized();

        assert_eq!(bounds.min_radius, 10.0);
        assert_eq!(bounds.max_radius, 100.0);
        assert_eq!(bounds.min_polar, POLE_MARGIN);
        assert_relative_eq!(bounds.max_polar, std::f32::consts::PI - POLE_MARGIN);
    }

    #[test]
    fn test_resize_ignores_zero() {
        let mut cam = camera();
        cam.resize_projection(800, 0);
        assert_relative_eq!(cam.aspect, 16.0 / 9.0);
        cam.resize_projection(800, 400);
        assert_relative_eq!(cam.aspect, 2.0);
    }
}
