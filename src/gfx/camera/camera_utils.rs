use cgmath::{Matrix4, SquareMatrix};
use winit::event::{DeviceEvent, KeyEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};
use crate::settings::{CameraSettings, ControlSettings};

pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Builds the perspective camera and its orbit controls
    pub fn from_settings(camera: &CameraSettings, controls: &ControlSettings, aspect: f32) -> Self {
        let orbit = OrbitCamera::looking_at(camera.position, camera.target, aspect)
            .with_projection(camera.fov(), camera.near, camera.far)
            .with_distance_bounds(controls.min_distance, controls.max_distance);
        let mut manager = Self::new(orbit, CameraController::from_settings(controls));
        manager.update();
        manager
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.controller.process_keyed_events(event);
    }

    /// Advances the controls by one step and refreshes the camera uniform.
    /// Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let moved = self.controller.update(&mut self.camera);
        self.camera.update_view_proj();
        moved
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_uses_configured_projection() {
        let manager =
            CameraManager::from_settings(&CameraSettings::default(), &ControlSettings::default(), 1.5);
        let camera = &manager.camera;

        assert!((camera.fovy.0 - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 20.0);
        assert_eq!(camera.bounds.min_distance, Some(1.0));
        assert_eq!(camera.bounds.max_distance, Some(10.0));
        assert_eq!(camera.uniform.view_position[0], camera.eye.x);
    }
}
