use cgmath::{InnerSpace, Vector2, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;
use crate::settings::ControlSettings;

/// Pending motion smaller than this is considered settled
const REST_EPSILON: f32 = 1e-6;

/// Orbit controls: turns mouse input into pending camera motion and applies it
/// a step at a time in [`CameraController::update`].
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vector2<f32>,
    pending_zoom: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.002,
            enable_damping: false,
            damping_factor: 0.05,
            is_shift_held: false,
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vector2::zero(),
            pending_zoom: 0.0,
        }
    }

    pub fn from_settings(settings: &ControlSettings) -> Self {
        let mut controller = Self::new(settings.rotate_speed, settings.zoom_speed);
        controller.pan_speed = settings.pan_speed;
        controller.enable_damping = settings.enable_damping;
        controller.damping_factor = settings.damping_factor.clamp(f32::EPSILON, 1.0);
        controller
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.zoom(scroll_amount * self.zoom_speed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    let delta = (delta.0 as f32, delta.1 as f32);
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move focus point)
                        self.pan((-delta.0 * self.pan_speed, delta.1 * self.pan_speed));
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around focus)
                        self.rotate(-delta.0 * self.rotate_speed, delta.1 * self.rotate_speed);
                    }
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
            state,
            ..
        } = event
        {
            self.is_shift_held = *state == ElementState::Pressed;
        }
    }

    /// Queues an orbit by the given yaw/pitch deltas in radians
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.pending_yaw += yaw;
        self.pending_pitch += pitch;
    }

    /// Queues a pan in view-relative units (scaled by distance when applied)
    pub fn pan(&mut self, delta: (f32, f32)) {
        self.pending_pan += Vector2::new(delta.0, delta.1);
    }

    /// Queues a zoom, positive moves away from the target
    pub fn zoom(&mut self, delta: f32) {
        self.pending_zoom += delta;
    }

    /// True when no motion is left to apply
    pub fn is_settled(&self) -> bool {
        self.pending_yaw == 0.0
            && self.pending_pitch == 0.0
            && self.pending_pan.is_zero()
            && self.pending_zoom == 0.0
    }

    /// Applies one step of pending motion to the camera.
    ///
    /// With damping enabled only `damping_factor` of the pending rotation and
    /// pan is applied and the rest carries over to the next frame, so motion
    /// eases out instead of stopping dead. Zoom is applied at once, scaled by
    /// the current distance. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if self.is_settled() {
            return false;
        }

        let before = (camera.eye, camera.target);
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        if self.pending_zoom != 0.0 {
            let scale = 1.0 + self.pending_zoom;
            camera.set_distance(camera.distance * scale.max(f32::EPSILON));
            self.pending_zoom = 0.0;
        }

        if self.pending_yaw != 0.0 || self.pending_pitch != 0.0 {
            camera.add_yaw(self.pending_yaw * step);
            camera.add_pitch(self.pending_pitch * step);
            self.pending_yaw *= 1.0 - step;
            self.pending_pitch *= 1.0 - step;
        }

        if !self.pending_pan.is_zero() {
            camera.pan((self.pending_pan.x * step, self.pending_pan.y * step));
            self.pending_pan *= 1.0 - step;
        }

        if self.pending_yaw.abs() < REST_EPSILON {
            self.pending_yaw = 0.0;
        }
        if self.pending_pitch.abs() < REST_EPSILON {
            self.pending_pitch = 0.0;
        }
        if self.pending_pan.magnitude() < REST_EPSILON {
            self.pending_pan = Vector2::zero();
        }

        (camera.eye - before.0).magnitude() > REST_EPSILON
            || (camera.target - before.1).magnitude() > REST_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(
            Vector3::new(-0.75, 0.7, 1.25),
            Vector3::new(0.0, 0.35, 0.0),
            1.0,
        )
        .with_distance_bounds(1.0, 10.0)
    }

    fn damped_controller() -> CameraController {
        CameraController::from_settings(&ControlSettings::default())
    }

    #[test]
    fn test_idle_controls_do_not_move_camera() {
        let mut controller = damped_controller();
        let mut camera = camera();
        let eye = camera.eye;

        assert!(!controller.update(&mut camera));
        assert_eq!(camera.eye, eye);
        assert!(controller.is_settled());
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut controller = damped_controller();
        let mut camera = camera();
        let start_yaw = camera.yaw;

        controller.rotate(0.5, 0.0);
        assert!(controller.update(&mut camera));
        // Only a fraction lands on the first frame
        let first_step = camera.yaw - start_yaw;
        assert!((first_step - 0.5 * 0.05).abs() < 1e-5);

        let mut frames = 1;
        while !controller.is_settled() && frames < 10_000 {
            controller.update(&mut camera);
            frames += 1;
        }
        assert!(controller.is_settled());
        assert!((camera.yaw - start_yaw - 0.5).abs() < 1e-3);
        assert!(!controller.update(&mut camera));
    }

    #[test]
    fn test_undamped_rotation_applies_at_once() {
        let mut controller = damped_controller();
        controller.enable_damping = false;
        let mut camera = camera();
        let start_yaw = camera.yaw;

        controller.rotate(0.25, 0.0);
        assert!(controller.update(&mut camera));
        assert!((camera.yaw - start_yaw - 0.25).abs() < 1e-6);
        assert!(controller.is_settled());
    }

    #[test]
    fn test_zoom_respects_distance_bounds() {
        let mut controller = damped_controller();
        let mut camera = camera();

        controller.zoom(100.0);
        controller.update(&mut camera);
        assert_eq!(camera.distance, 10.0);

        controller.zoom(-0.99);
        controller.update(&mut camera);
        assert_eq!(camera.distance, 1.0);
    }
}
