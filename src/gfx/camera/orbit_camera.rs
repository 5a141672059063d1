use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting a target point, Y-up
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.build_gl_view_projection_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: cgmath::Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Creates a camera at `eye` orbiting `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(distance, pitch, yaw, target, aspect)
    }

    /// Sets the perspective parameters
    pub fn with_projection(mut self, fovy: Rad<f32>, znear: f32, zfar: f32) -> Self {
        self.fovy = fovy;
        self.znear = znear;
        self.zfar = zfar;
        self
    }

    /// Sets the distance bounds and re-clamps the current distance
    pub fn with_distance_bounds(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.bounds.min_distance = Some(min_distance);
        self.bounds.max_distance = Some(max_distance);
        self.set_distance(self.distance);
        self
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Moves the target relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance so panning feels the same at every zoom level
        let pan_scale = self.distance;
        self.target += (right * delta.0 + up * delta.1) * pan_scale;
        self.update();
    }

    /// Updates the camera after changing `distance`, `pitch`, `yaw` or `target`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    /// Updates the aspect ratio; a zero-sized viewport keeps the previous one.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// View-projection in OpenGL clip space (z in -1..1), used for ray casting
    pub fn build_gl_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj = perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

/// Keeps the eye off the poles, where `look_at` with a Y-up vector degenerates
const POLE_MARGIN: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + POLE_MARGIN,
            max_pitch: std::f32::consts::FRAC_PI_2 - POLE_MARGIN,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_looking_at_reproduces_eye() {
        let eye = Vector3::new(-0.75, 0.7, 1.25);
        let target = Vector3::new(0.0, 0.35, 0.0);
        let camera = OrbitCamera::looking_at(eye, target, 1.5);

        assert_close(camera.eye, eye);
        assert_close(camera.target, target);
        assert!((camera.distance - 2.2475f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_distance_bounds_clamp() {
        let mut camera = OrbitCamera::looking_at(
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::zero(),
            1.0,
        )
        .with_distance_bounds(1.0, 10.0);

        camera.set_distance(0.2);
        assert_eq!(camera.distance, 1.0);
        camera.set_distance(42.0);
        assert_eq!(camera.distance, 10.0);
    }

    #[test]
    fn test_zero_sized_resize_keeps_aspect() {
        let mut camera = OrbitCamera::looking_at(Vector3::unit_z(), Vector3::zero(), 1.0);
        camera.resize_projection(1600, 800);
        assert_eq!(camera.aspect, 2.0);

        camera.resize_projection(0, 800);
        camera.resize_projection(1600, 0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_pitch_stays_away_from_poles() {
        let mut camera = OrbitCamera::looking_at(Vector3::unit_z(), Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.add_pitch(-20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }
}
