use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::WindowEvent;

use super::{
    camera_controller::{CameraController, PointerClick},
    orbit_camera::OrbitCamera,
};

/// Owns the camera together with the controller feeding it.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Returns a click position when the event completes a click rather than a drag
    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<PointerClick> {
        self.controller.process_window_event(event, &mut self.camera)
    }

    /// Moves the target to `center`, snapping to the configured inspection radius
    pub fn focus_room(&mut self, center: Vector3<f32>) {
        self.camera = self
            .camera
            .focus_on(center, self.controller.config.focus_radius);
    }

    /// Returns the target to the home target; angles and radius stay
    pub fn clear_focus(&mut self) {
        self.camera = self.camera.focus_on(self.camera.home.target, None);
    }

    pub fn reset(&mut self) {
        self.controller.cancel();
        self.camera = self.camera.reset();
    }

    /// Get the view projection matrix from the camera
    pub fn get_view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{ControllerConfig, HomeView, OrbitCameraBounds};

    #[test]
    fn test_focus_and_clear() {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0);
        let controller = CameraController::new(ControllerConfig::default().with_focus_radius(Some(25.0)));
        let mut manager = CameraManager::new(camera, controller);
        let polar = manager.camera.polar;

        manager.focus_room(Vector3::new(10.0, 1.5, -5.0));
        assert_eq!(manager.camera.target, Vector3::new(10.0, 1.5, -5.0));
        assert_eq!(manager.camera.radius, 25.0);

        manager.clear_focus();
        assert_eq!(manager.camera.target, HomeView::default().target);
        assert_eq!(manager.camera.radius, 25.0);
        assert_eq!(manager.camera.polar, polar);
    }

    #[test]
    fn test_uniform_matches_matrix() {
        let mut camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.5);
        camera.update_view_proj();
        let expected: [[f32; 4]; 4] = camera.build_view_projection_matrix().into();

        assert_eq!(camera.uniform.view_proj, expected);
        assert_eq!(camera.uniform.view_position[3], 1.0);
    }
}
