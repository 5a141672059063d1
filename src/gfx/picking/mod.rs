//! # Click Picking
//!
//! Mouse ray-casting against a small registry of clickable regions.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: window pixels are rescaled to normalized device coordinates
//! 2. **NDC to Ray**: the point is unprojected through the camera into a world-space ray
//! 3. **Dispatch**: regions are tested in registration order and the first hit runs its callback
//!
//! ## Usage
//!
//! ```no_run
//! use sheen_viewer::gfx::picking::{ClickRegistry, ClickShape, Quad, screen_to_ray};
//! # use sheen_viewer::gfx::camera::OrbitCamera;
//! # use sheen_viewer::navigation::HistoryNavigator;
//! # use cgmath::Vector3;
//! # let camera = OrbitCamera::looking_at(Vector3::unit_z(), Vector3::new(0.0, 0.0, 0.0), 1.0);
//! # let mut navigator = HistoryNavigator::new();
//!
//! let mut registry = ClickRegistry::new();
//! let quad = Quad::new(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_x(), Vector3::unit_y(), 0.3, 0.1);
//! registry.register("label", ClickShape::Quad(quad), |_hit, nav| nav.navigate("/"));
//!
//! let ray = screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera);
//! registry.dispatch(&ray, &mut navigator);
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector2, Vector3, Vector4, Zero};

use crate::{gfx::camera::orbit_camera::OrbitCamera, navigation::Navigator};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// A bounded, double-sided rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub center: Vector3<f32>,
    /// Unit vector along the quad's width
    pub right: Vector3<f32>,
    /// Unit vector along the quad's height
    pub up: Vector3<f32>,
    pub half_width: f32,
    pub half_height: f32,
}

impl Quad {
    pub fn new(
        center: Vector3<f32>,
        right: Vector3<f32>,
        up: Vector3<f32>,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            center,
            right: right.normalize(),
            up: up.normalize(),
            half_width: width * 0.5,
            half_height: height * 0.5,
        }
    }

    /// Quad of the given size in the local XY plane, placed by `transform`
    pub fn from_transform(transform: &Matrix4<f32>, width: f32, height: f32) -> Self {
        let center = *transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let right = *transform * Vector4::unit_x();
        let up = *transform * Vector4::unit_y();
        let scale_x = right.truncate().magnitude();
        let scale_y = up.truncate().magnitude();

        Self::new(
            center.truncate() / center.w,
            right.truncate(),
            up.truncate(),
            width * scale_x,
            height * scale_y,
        )
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.right.cross(self.up).normalize()
    }

    /// Distance along the ray to the quad, hitting either face
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let normal = self.normal();
        let denom = normal.dot(ray.direction);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.center - ray.origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }

        let local = ray.point_at(t) - self.center;
        let inside = local.dot(self.right).abs() <= self.half_width
            && local.dot(self.up).abs() <= self.half_height;
        inside.then_some(t)
    }
}

/// Shape of a clickable region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickShape {
    Quad(Quad),
    Aabb(Aabb),
}

impl ClickShape {
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            ClickShape::Quad(quad) => quad.intersect_ray(ray),
            ClickShape::Aabb(aabb) => aabb.intersect_ray(ray),
        }
    }
}

/// Result of a click that landed on a region
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub region: RegionId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub usize);

// Click callback type
pub type ClickCallback = Box<dyn FnMut(&PickHit, &mut dyn Navigator)>;

struct ClickRegion {
    name: String,
    shape: ClickShape,
    callback: ClickCallback,
}

/// Clickable regions tested in registration order, first hit wins
#[derive(Default)]
pub struct ClickRegistry {
    regions: Vec<ClickRegion>,
}

impl ClickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, shape: ClickShape, callback: F) -> RegionId
    where
        F: FnMut(&PickHit, &mut dyn Navigator) + 'static,
    {
        self.regions.push(ClickRegion {
            name: name.to_string(),
            shape,
            callback: Box::new(callback),
        });
        RegionId(self.regions.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn name(&self, id: RegionId) -> Option<&str> {
        self.regions.get(id.0).map(|region| region.name.as_str())
    }

    /// Returns the first region the ray hits without running its callback
    pub fn hit_test(&self, ray: &Ray) -> Option<PickHit> {
        self.regions.iter().enumerate().find_map(|(i, region)| {
            region.shape.intersect_ray(ray).map(|distance| PickHit {
                region: RegionId(i),
                distance,
                point: ray.point_at(distance),
            })
        })
    }

    /// Runs the callback of the first region the ray hits
    pub fn dispatch(&mut self, ray: &Ray, navigator: &mut dyn Navigator) -> Option<PickHit> {
        let hit = self.hit_test(ray)?;
        let region = &mut self.regions[hit.region.0];
        log::debug!("Click hit region '{}' at {:.3}", region.name, hit.distance);
        (region.callback)(&hit, navigator);
        Some(hit)
    }
}

/// Last known pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Position in window pixels
    pub position: Vector2<f32>,
    /// Position in normalized device coordinates
    pub ndc: Vector2<f32>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vector2::zero(),
            ndc: Vector2::zero(),
        }
    }
}

impl PointerState {
    pub fn update(&mut self, position: (f32, f32), screen_size: (f32, f32)) {
        self.position = Vector2::new(position.0, position.1);
        self.ndc = screen_to_ndc(position, screen_size);
    }
}

/// Convert window pixels to normalized device coordinates (-1 to 1, Y up)
pub fn screen_to_ndc(screen_pos: (f32, f32), screen_size: (f32, f32)) -> Vector2<f32> {
    let width = screen_size.0.max(1.0);
    let height = screen_size.1.max(1.0);
    Vector2::new(
        (2.0 * screen_pos.0) / width - 1.0,
        1.0 - (2.0 * screen_pos.1) / height, // Flip Y axis
    )
}

/// Convert screen coordinates to a world-space ray
pub fn screen_to_ray(screen_pos: (f32, f32), screen_size: (f32, f32), camera: &OrbitCamera) -> Ray {
    ndc_to_ray(screen_to_ndc(screen_pos, screen_size), camera)
}

/// Unproject a point in normalized device coordinates into a world-space ray
pub fn ndc_to_ray(ndc: Vector2<f32>, camera: &OrbitCamera) -> Ray {
    let view_proj = camera.build_gl_view_projection_matrix();
    let inv_view_proj = view_proj.invert().unwrap_or(Matrix4::from_scale(1.0));

    let world_near = inv_view_proj * Vector4::new(ndc.x, ndc.y, -1.0, 1.0);
    let world_far = inv_view_proj * Vector4::new(ndc.x, ndc.y, 1.0, 1.0);

    let near_3d = world_near.truncate() / world_near.w;
    let far_3d = world_far.truncate() / world_far.w;

    Ray::new(near_3d, far_3d - near_3d)
}

/// Project a world-space point to normalized device coordinates
pub fn world_to_ndc(point: Vector3<f32>, camera: &OrbitCamera) -> Vector2<f32> {
    let clip = camera.build_gl_view_projection_matrix() * point.extend(1.0);
    Vector2::new(clip.x / clip.w, clip.y / clip.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;

    fn label_quad() -> Quad {
        Quad::new(
            Vector3::new(0.0, 0.555, -0.26),
            Vector3::unit_x(),
            Vector3::unit_y(),
            0.3,
            0.1,
        )
    }

    fn scene_camera() -> OrbitCamera {
        OrbitCamera::looking_at(
            Vector3::new(-0.75, 0.7, 1.25),
            Vector3::new(0.0, 0.35, 0.0),
            800.0 / 600.0,
        )
        .with_projection(cgmath::Rad(45f32.to_radians()), 0.1, 20.0)
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray).is_some());

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_quad_hits_from_both_sides() {
        let quad = label_quad();
        let front = Ray::new(Vector3::new(0.0, 0.555, 2.0), -Vector3::unit_z());
        let back = Ray::new(Vector3::new(0.1, 0.58, -3.0), Vector3::unit_z());

        assert!((quad.intersect_ray(&front).unwrap() - 2.26).abs() < 1e-5);
        assert!(quad.intersect_ray(&back).is_some());
    }

    #[test]
    fn test_quad_misses_outside_bounds_and_behind() {
        let quad = label_quad();
        let outside = Ray::new(Vector3::new(0.16, 0.555, 2.0), -Vector3::unit_z());
        let behind = Ray::new(Vector3::new(0.0, 0.555, 2.0), Vector3::unit_z());
        let parallel = Ray::new(Vector3::new(0.0, 0.555, 2.0), Vector3::unit_x());

        assert!(quad.intersect_ray(&outside).is_none());
        assert!(quad.intersect_ray(&behind).is_none());
        assert!(quad.intersect_ray(&parallel).is_none());
    }

    #[test]
    fn test_quad_from_transform() {
        let transform = Matrix4::from_translation(Vector3::new(0.0, 0.555, -0.26));
        let quad = Quad::from_transform(&transform, 0.3, 0.1);

        assert_eq!(quad, label_quad());
        assert_eq!(quad.normal(), Vector3::unit_z());
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        let size = (800.0, 600.0);
        assert_eq!(screen_to_ndc((0.0, 0.0), size), Vector2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc((800.0, 600.0), size), Vector2::new(1.0, -1.0));
        assert_eq!(screen_to_ndc((400.0, 300.0), size), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_projected_label_center_hits_and_corner_misses() {
        let camera = scene_camera();
        let quad = label_quad();

        let center_ndc = world_to_ndc(quad.center, &camera);
        let ray = ndc_to_ray(center_ndc, &camera);
        let distance = quad.intersect_ray(&ray).expect("label center must be hit");
        assert!((ray.point_at(distance) - quad.center).magnitude() < 1e-3);

        let corner = ndc_to_ray(Vector2::new(-1.0, -1.0), &camera);
        assert!(quad.intersect_ray(&corner).is_none());
    }

    #[test]
    fn test_registry_first_registered_hit_wins() {
        let mut registry = ClickRegistry::new();
        let near = Quad::new(Vector3::new(0.0, 0.0, 1.0), Vector3::unit_x(), Vector3::unit_y(), 1.0, 1.0);
        let far = Quad::new(Vector3::new(0.0, 0.0, -1.0), Vector3::unit_x(), Vector3::unit_y(), 1.0, 1.0);

        // The farther region is registered first and must still win
        let far_id = registry.register("far", ClickShape::Quad(far), |_, nav| nav.navigate("/far"));
        registry.register("near", ClickShape::Quad(near), |_, nav| nav.navigate("/near"));

        let mut navigator = HistoryNavigator::new();
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), -Vector3::unit_z());
        let hit = registry.dispatch(&ray, &mut navigator).unwrap();

        assert_eq!(hit.region, far_id);
        assert_eq!(registry.name(far_id), Some("far"));
        assert_eq!(navigator.history(), ["/far".to_string()]);
    }

    #[test]
    fn test_registry_miss_runs_nothing() {
        let mut registry = ClickRegistry::new();
        registry.register("label", ClickShape::Quad(label_quad()), |_, nav| nav.navigate("/"));

        let mut navigator = HistoryNavigator::new();
        let ray = Ray::new(Vector3::new(5.0, 5.0, 5.0), Vector3::unit_x());

        assert!(registry.dispatch(&ray, &mut navigator).is_none());
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn test_pointer_state_starts_at_origin() {
        let pointer = PointerState::default();

        assert_eq!(pointer.position, Vector2::new(0.0, 0.0));
        assert_eq!(pointer.ndc, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_pointer_state_tracks_ndc() {
        let mut pointer = PointerState::default();
        pointer.update((200.0, 150.0), (800.0, 600.0));

        assert_eq!(pointer.position, Vector2::new(200.0, 150.0));
        assert_eq!(pointer.ndc, Vector2::new(-0.5, 0.5));
    }
}
