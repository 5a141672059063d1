//! Procedural room environment used for image-based ambient lighting.
//!
//! The room is an axis-aligned box with a dim diffuse interior and a handful
//! of bright emissive panels. It is baked once into an [`AmbientCube`]: six
//! cosine-weighted irradiance samples, one per axis direction, which the mesh
//! shader blends by the squared components of the surface normal.

use cgmath::{InnerSpace, Vector3};

use crate::gfx::picking::{Aabb, Ray};

/// Emissive rectangle (a thin box) inside the room
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPanel {
    pub bounds: Aabb,
    pub radiance: f32,
}

impl LightPanel {
    pub fn new(min: [f32; 3], max: [f32; 3], radiance: f32) -> Self {
        Self {
            bounds: Aabb::new(Vector3::from(min), Vector3::from(max)),
            radiance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomEnvironment {
    /// Radiance of the walls and ceiling
    pub wall_radiance: f32,
    /// Radiance of the floor
    pub floor_radiance: f32,
    pub panels: Vec<LightPanel>,
    /// Hemisphere samples per cube face
    pub samples: u32,
}

impl Default for RoomEnvironment {
    fn default() -> Self {
        Self {
            wall_radiance: 0.35,
            floor_radiance: 0.2,
            panels: vec![
                // ceiling
                LightPanel::new([-2.0, 4.8, -2.0], [2.0, 5.0, 2.0], 8.0),
                // side walls
                LightPanel::new([4.8, 0.5, -1.5], [5.0, 3.5, 1.5], 3.0),
                LightPanel::new([-5.0, 0.5, -1.5], [-4.8, 3.5, 1.5], 3.0),
                // back wall
                LightPanel::new([-1.5, 0.5, -5.0], [1.5, 3.5, -4.8], 2.0),
            ],
            samples: 512,
        }
    }
}

/// Irradiance for the six axis directions, ordered +X, -X, +Y, -Y, +Z, -Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientCube {
    pub faces: [[f32; 3]; 6],
}

impl AmbientCube {
    /// Same light from every direction
    pub fn uniform(value: f32) -> Self {
        Self {
            faces: [[value; 3]; 6],
        }
    }

    /// Blends the faces for `normal`, matching the mesh shader
    pub fn irradiance(&self, normal: Vector3<f32>) -> [f32; 3] {
        let n = normal.normalize();
        let pick = |positive: usize, component: f32| {
            if component >= 0.0 {
                self.faces[positive]
            } else {
                self.faces[positive + 1]
            }
        };
        let (x, y, z) = (pick(0, n.x), pick(2, n.y), pick(4, n.z));
        let weights = [n.x * n.x, n.y * n.y, n.z * n.z];

        [0, 1, 2].map(|c| x[c] * weights[0] + y[c] * weights[1] + z[c] * weights[2])
    }

    /// Faces padded to vec4 for upload
    pub fn to_padded(self) -> [[f32; 4]; 6] {
        self.faces.map(|[r, g, b]| [r, g, b, 1.0])
    }
}

impl Default for AmbientCube {
    fn default() -> Self {
        RoomEnvironment::default().ambient_cube()
    }
}

impl RoomEnvironment {
    /// Radiance seen along `direction` from the room centre
    pub fn radiance(&self, direction: Vector3<f32>) -> f32 {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), direction);
        let nearest = self
            .panels
            .iter()
            .filter_map(|panel| panel.bounds.intersect_ray(&ray).map(|t| (t, panel.radiance)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((_, radiance)) => radiance,
            None if direction.y < 0.0 => self.floor_radiance,
            None => self.wall_radiance,
        }
    }

    /// Cosine-weighted average radiance over the hemisphere around `normal`
    pub fn irradiance(&self, normal: Vector3<f32>) -> f32 {
        let normal = normal.normalize();
        let helper = if normal.y.abs() < 0.99 {
            Vector3::unit_y()
        } else {
            Vector3::unit_x()
        };
        let tangent = helper.cross(normal).normalize();
        let bitangent = normal.cross(tangent);

        let samples = self.samples.max(1);
        let golden = 0.618_034_f32;
        let total: f32 = (0..samples)
            .map(|i| {
                // Fibonacci spiral mapped onto a cosine-distributed disk
                let u1 = (i as f32 + 0.5) / samples as f32;
                let u2 = (i as f32 * golden).fract();
                let r = u1.sqrt();
                let phi = std::f32::consts::TAU * u2;
                let direction = tangent * (r * phi.cos())
                    + bitangent * (r * phi.sin())
                    + normal * (1.0 - u1).sqrt();
                self.radiance(direction)
            })
            .sum();

        total / samples as f32
    }

    pub fn ambient_cube(&self) -> AmbientCube {
        let axes = [
            Vector3::unit_x(),
            -Vector3::unit_x(),
            Vector3::unit_y(),
            -Vector3::unit_y(),
            Vector3::unit_z(),
            -Vector3::unit_z(),
        ];
        let faces = axes.map(|axis| [self.irradiance(axis); 3]);
        log::debug!("Baked room environment: {faces:?}");
        AmbientCube { faces }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_light_brightens_upward_faces() {
        let cube = RoomEnvironment::default().ambient_cube();
        let up = cube.faces[2][0];
        let down = cube.faces[3][0];

        assert!(up > down, "up {up} should exceed down {down}");
        assert!(down > 0.0);
    }

    #[test]
    fn test_empty_room_is_uniform_per_hemisphere() {
        let room = RoomEnvironment {
            wall_radiance: 0.5,
            floor_radiance: 0.5,
            panels: Vec::new(),
            samples: 64,
        };
        let cube = room.ambient_cube();
        for face in cube.faces {
            assert!((face[0] - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_irradiance_blends_faces() {
        let mut cube = AmbientCube::uniform(0.0);
        cube.faces[2] = [1.0; 3];

        assert_eq!(cube.irradiance(Vector3::unit_y()), [1.0; 3]);
        assert_eq!(cube.irradiance(-Vector3::unit_y()), [0.0; 3]);
        let diagonal = cube.irradiance(Vector3::new(1.0, 1.0, 0.0));
        assert!((diagonal[0] - 0.5).abs() < 1e-5);
    }
}
