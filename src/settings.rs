//! # Viewer Settings
//!
//! Every tunable the viewer uses lives here as plain data with a `Default`
//! implementation. There is no config file; callers that want something
//! different build a [`ViewerSettings`] and override fields before handing it
//! to [`crate::ViewerApp::new`].

use std::path::PathBuf;

use cgmath::{Rad, Vector3};

/// Top-level settings bundle for the viewer
#[derive(Debug, Clone, Default)]
pub struct ViewerSettings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub controls: ControlSettings,
    pub render: RenderSettings,
    pub model: ModelSettings,
    pub label: LabelSettings,
    pub navigation: NavigationSettings,
    pub overlay: OverlaySettings,
}

#[derive(Debug, Clone)]
pub struct WindowSettings {
    pub title: String,
    /// Initial logical size of the window
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Sheen Viewer".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Perspective camera setup
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position
    pub position: Vector3<f32>,
    /// Orbit target the camera looks at
    pub target: Vector3<f32>,
}

impl CameraSettings {
    /// Field of view in radians
    pub fn fov(&self) -> Rad<f32> {
        Rad(self.fov_degrees.to_radians())
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 20.0,
            position: Vector3::new(-0.75, 0.7, 1.25),
            target: Vector3::new(0.0, 0.35, 0.0),
        }
    }
}

/// Orbit control behaviour
#[derive(Debug, Clone, Copy)]
pub struct ControlSettings {
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per frame when damping
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of mouse drag
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 1.0,
            max_distance: 10.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// MSAA sample count, 1 disables anti-aliasing
    pub sample_count: u32,
    pub exposure: f32,
    /// Flat background colour as 0xRRGGBB
    pub background: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_count: 4,
            exposure: 1.0,
            background: 0xbbbbbb,
        }
    }
}

/// Where the model comes from and which node anchors the label
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_path: PathBuf,
    pub file_name: String,
    pub anchor_node: String,
}

impl ModelSettings {
    /// Full path of the model file, base path joined with the file name
    pub fn path(&self) -> PathBuf {
        self.base_path.join(&self.file_name)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("../models/"),
            file_name: "SheenChair.glb".to_string(),
            anchor_node: "SheenChair_fabric".to_string(),
        }
    }
}

/// Text, styling and placement of the clickable label
#[derive(Debug, Clone)]
pub struct LabelSettings {
    pub text: String,
    pub background: String,
    pub text_color: String,
    /// Font specifier, must carry a unit (e.g. "10px")
    pub font: String,
    /// Padding around the text in pixels
    pub padding: u32,
    /// Plane size in world units
    pub width: f32,
    pub height: f32,
    pub position: Vector3<f32>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            text: "About Me".to_string(),
            background: "transparent".to_string(),
            text_color: "black".to_string(),
            font: "10px".to_string(),
            padding: 5,
            width: 0.3,
            height: 0.1,
            position: Vector3::new(0.0, 0.555, -0.26),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigationSettings {
    /// Location visited when the label is clicked
    pub target: String,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            target: "/".to_string(),
        }
    }
}

/// Static informational overlay
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub text: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            position: [50.0, 50.0],
            size: [200.0, 100.0],
            color: [1.0, 1.0, 1.0, 1.0],
            text: "Great discoveries await those who dare to look beneath the surface, \
                   even if it means peeking under the chair."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path_joins_base_and_file() {
        let model = ModelSettings::default();
        assert_eq!(model.path(), PathBuf::from("../models/SheenChair.glb"));
    }

    #[test]
    fn test_camera_fov_in_radians() {
        let camera = CameraSettings::default();
        assert!((camera.fov().0 - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
