use serde::Deserialize;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;
use crate::gfx::picking::ClickTracker;

/// Wheel "pixels" per scroll line, matching a typical browser notch
const LINE_HEIGHT_PX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Fractional radius change per wheel pixel
    pub zoom_speed: f32,
    /// Largest press/release distance in pixels still treated as a click
    pub click_threshold: f32,
    /// Radius to snap to when focusing a selected room
    pub focus_radius: Option<f32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.001,
            click_threshold: 5.0,
            focus_radius: Some(30.0),
        }
    }
}

impl ControllerConfig {
    pub fn with_rotate_speed(mut self, rotate_speed: f32) -> Self {
        self.rotate_speed = rotate_speed;
        self
    }

    pub fn with_zoom_speed(mut self, zoom_speed: f32) -> Self {
        self.zoom_speed = zoom_speed;
        self
    }

    pub fn with_click_threshold(mut self, click_threshold: f32) -> Self {
        self.click_threshold = click_threshold;
        self
    }

    pub fn with_focus_radius(mut self, focus_radius: Option<f32>) -> Self {
        self.focus_radius = focus_radius;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { last: (f32, f32) },
}

/// A primary-button press and release close enough together to count as a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerClick {
    pub position: (f32, f32),
}

/// Turns pointer input into camera updates.
pub struct CameraController {
    pub config: ControllerConfig,
    state: DragState,
    clicks: ClickTracker,
    cursor: Option<(f32, f32)>,
}

impl CameraController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
            clicks: ClickTracker::new(config.click_threshold),
            cursor: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn pointer_pressed(&mut self, position: (f32, f32)) {
        self.state = DragState::Dragging { last: position };
        self.clicks.press(position);
    }

    pub fn pointer_moved(&mut self, position: (f32, f32), camera: OrbitCamera) -> OrbitCamera {
        self.cursor = Some(position);
        match self.state {
            DragState::Dragging { last } => {
                self.state = DragState::Dragging { last: position };
                camera.apply_drag(
                    (position.0 - last.0, position.1 - last.1),
                    self.config.rotate_speed,
                )
            }
            DragState::Idle => camera,
        }
    }

    pub fn pointer_released(&mut self, position: (f32, f32)) -> Option<PointerClick> {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        if was_dragging && self.clicks.release(position) {
            Some(PointerClick { position })
        } else {
            None
        }
    }

    /// Pointer left the window: ends any drag without a click
    pub fn pointer_left(&mut self) {
        self.cursor = None;
        self.cancel();
    }

    /// A panel kept a pointer event: ends any drag without a click
    pub fn pointer_captured(&mut self, position: Option<(f32, f32)>) {
        if position.is_some() {
            self.cursor = position;
        }
        self.cancel();
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.clicks.cancel();
    }

    /// Wheel delta with positive values zooming out
    pub fn wheel(&self, delta_y: f32, camera: OrbitCamera) -> OrbitCamera {
        camera.apply_zoom(delta_y, self.config.zoom_speed)
    }

    /// winit adapter. Returns a click when a release completes one.
    pub fn process_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &mut OrbitCamera,
    ) -> Option<PointerClick> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = (position.x as f32, position.y as f32);
                *camera = self.pointer_moved(position, *camera);
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer_left();
                None
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let position = self.cursor?;
                match state {
                    ElementState::Pressed => {
                        self.pointer_pressed(position);
                        None
                    }
                    ElementState::Released => self.pointer_released(position),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; up zooms in
                let delta_y = -match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32,
                };
                *camera = self.wheel(delta_y, *camera);
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{HomeView, OrbitCameraBounds};

    fn setup() -> (CameraController, OrbitCamera) {
        (
            CameraController::new(ControllerConfig::default()),
            OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0),
        )
    }

    #[test]
    fn test_small_release_is_click() {
        let (mut controller, _) = setup();
        controller.pointer_pressed((100.0, 100.0));
        assert_eq!(
            controller.pointer_released((101.0, 101.0)),
            Some(PointerClick { position: (101.0, 101.0) })
        );
    }

    #[test]
    fn test_long_release_is_drag() {
        let (mut controller, camera) = setup();
        controller.pointer_pressed((100.0, 100.0));
        let moved = controller.pointer_moved((200.0, 200.0), camera);
        assert_ne!(moved.azimuth, camera.azimuth);
        assert_eq!(controller.pointer_released((200.0, 200.0)), None);
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let (mut controller, camera) = setup();
        let moved = controller.pointer_moved((300.0, 40.0), camera);
        assert_eq!(moved.azimuth, camera.azimuth);
        assert_eq!(moved.polar, camera.polar);
    }

    #[test]
    fn test_deltas_are_incremental() {
        let (mut controller, camera) = setup();
        controller.pointer_pressed((0.0, 0.0));
        let a = controller.pointer_moved((10.0, 0.0), camera);
        let b = controller.pointer_moved((20.0, 0.0), a);
        let expected = camera.apply_drag((20.0, 0.0), controller.config.rotate_speed);
        approx::assert_relative_eq!(b.azimuth, expected.azimuth, epsilon = 1e-5);
    }

    #[test]
    fn test_leave_cancels_drag() {
        let (mut controller, _) = setup();
        controller.pointer_pressed((50.0, 50.0));
        controller.pointer_left();
        assert!(!controller.is_dragging());
        assert_eq!(controller.pointer_released((50.0, 50.0)), None);
    }

    #[test]
    fn test_drag_over_panel_does_not_jump() {
        let (mut controller, camera) = setup();
        controller.pointer_pressed((100.0, 100.0));
        let dragged = controller.pointer_moved((110.0, 100.0), camera);

        controller.pointer_captured(Some((400.0, 300.0)));
        assert!(!controller.is_dragging());

        let after = controller.pointer_moved((420.0, 300.0), dragged);
        assert_eq!(after.azimuth, dragged.azimuth);
        assert_eq!(after.polar, dragged.polar);
        assert_eq!(controller.pointer_released((420.0, 300.0)), None);
    }

    #[test]
    fn test_wheel_independent_of_drag() {
        let (mut controller, camera) = setup();
        controller.pointer_pressed((0.0, 0.0));
        let zoomed = controller.wheel(-100.0, camera);
        assert!(zoomed.radius < camera.radius);
        assert!(controller.is_dragging());
    }
}
