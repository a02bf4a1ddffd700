//! # Room Picking
//!
//! Resolves a pointer click to at most one room by ray-casting against the
//! invisible per-room bounding volumes produced by the scene builder.
//!
//! ## How it works
//!
//! 1. **Click or drag**: [`ClickTracker`] compares press and release
//!    positions; anything that moved further than the threshold was a drag
//!    and never picks.
//! 2. **Pointer to ray**: [`screen_to_ray`] unprojects the pointer through the
//!    inverse of the camera's view-projection matrix.
//! 3. **Nearest hit**: [`pick_nearest`] slab-tests every [`RoomVolume`] and
//!    keeps the closest intersection.
//! 4. **Selection**: [`Selection::apply_pick`] applies toggle semantics.
//!
//! ## Usage
//!
//! ```no_run
//! use floodview::gfx::picking::{pick_room, Selection};
//! # fn demo(camera: &floodview::gfx::camera::OrbitCamera, volumes: &[floodview::gfx::picking::RoomVolume]) {
//! let mut selection = Selection::default();
//! let hit = pick_room((420.0, 300.0), (1280.0, 720.0), camera, volumes);
//! let change = selection.apply_pick(hit.map(|h| h.room_index));
//! # }
//! ```

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::{Camera, OrbitCamera};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
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

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Corners are reordered per axis so `min <= max` always holds
    pub fn new(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        Self {
            min: Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vector3<f32>) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    /// Slab test. Returns the distance along the ray to the entry point, or
    /// to the exit point when the origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < f32::EPSILON {
                // Parallel to this slab: either always inside it or never
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(if t_near >= 0.0 { t_near } else { t_far })
    }
}

/// Invisible picking volume for one room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomVolume {
    /// Index into the dataset's room list
    pub room_index: usize,
    pub aabb: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    pub room_index: usize,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    pub intersection_point: Vector3<f32>,
}

/// Converts window coordinates (origin top-left) to a world-space ray.
///
/// Returns `None` for a zero-sized window or a singular view-projection.
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Option<Ray> {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = screen_size;
    if screen_width <= 0.0 || screen_height <= 0.0 {
        return None;
    }

    let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height;

    let inv_view_proj: Matrix4<f32> = camera.build_view_projection_matrix().invert()?;

    // wgpu clip space has depth in 0..1
    let unproject = |z: f32| {
        let p = inv_view_proj * Vector4::new(ndc_x, ndc_y, z, 1.0);
        Vector3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    let direction = far - near;
    if direction.magnitude2() <= f32::EPSILON || !direction.x.is_finite() {
        return None;
    }
    Some(Ray::new(near, direction))
}

/// Closest volume hit by the ray
pub fn pick_nearest(ray: &Ray, volumes: &[RoomVolume]) -> Option<PickResult> {
    volumes
        .iter()
        .filter_map(|volume| {
            volume.aabb.intersect_ray(ray).map(|distance| PickResult {
                room_index: volume.room_index,
                distance,
                intersection_point: ray.point_at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Pointer position to picked room in one call
pub fn pick_room(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
    volumes: &[RoomVolume],
) -> Option<PickResult> {
    let ray = screen_to_ray(screen_pos, screen_size, camera)?;
    pick_nearest(&ray, volumes)
}

/// Separates clicks from drags by pointer travel between press and release.
#[derive(Debug, Clone, Copy)]
pub struct ClickTracker {
    threshold: f32,
    pressed_at: Option<(f32, f32)>,
}

impl ClickTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: if threshold.is_finite() { threshold.max(0.0) } else { 0.0 },
            pressed_at: None,
        }
    }

    pub fn press(&mut self, position: (f32, f32)) {
        self.pressed_at = Some(position);
    }

    /// True when the release is within the threshold of the press
    pub fn release(&mut self, position: (f32, f32)) -> bool {
        match self.pressed_at.take() {
            Some((x, y)) => {
                let (dx, dy) = (position.0 - x, position.1 - y);
                (dx * dx + dy * dy).sqrt() <= self.threshold
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.pressed_at = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

impl SelectionChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// At most one selected room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Clicking the selected room clears it, another room replaces it, and
    /// a miss clears.
    pub fn apply_pick(&mut self, hit: Option<usize>) -> SelectionChange {
        let previous = self.current;
        self.current = match hit {
            Some(index) if previous == Some(index) => None,
            other => other,
        };
        SelectionChange {
            previous,
            current: self.current,
        }
    }

    pub fn clear(&mut self) -> SelectionChange {
        let previous = self.current.take();
        SelectionChange {
            previous,
            current: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{HomeView, OrbitCameraBounds};
    use approx::assert_relative_eq;

    fn unit_box(room_index: usize, x: f32) -> RoomVolume {
        RoomVolume {
            room_index,
            aabb: Aabb::new(Vector3::new(x - 1.0, 0.0, -1.0), Vector3::new(x + 1.0, 3.0, 1.0)),
        }
    }

    #[test]
    fn test_slab_hit_and_miss() {
        let aabb = unit_box(0, 0.0).aabb;
        let down = Ray::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(aabb.intersect_ray(&down).unwrap(), 7.0);

        let beside = Ray::new(Vector3::new(5.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(aabb.intersect_ray(&beside).is_none());

        let away = Ray::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(aabb.intersect_ray(&away).is_none());
    }

    #[test]
    fn test_origin_inside_returns_exit() {
        let aabb = unit_box(0, 0.0).aabb;
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(aabb.intersect_ray(&ray).unwrap(), 1.0);
    }

    #[test]
    fn test_nearest_wins() {
        let volumes = [unit_box(0, 0.0), unit_box(1, 4.0)];
        let ray = Ray::new(Vector3::new(10.0, 1.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        let hit = pick_nearest(&ray, &volumes).unwrap();
        assert_eq!(hit.room_index, 1);
        assert_relative_eq!(hit.distance, 5.0);
    }

    #[test]
    fn test_empty_scene_never_hits() {
        let ray = Ray::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(pick_nearest(&ray, &[]).is_none());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0);
        let ray = screen_to_ray((400.0, 400.0), (800.0, 800.0), &camera).unwrap();
        let to_target = (camera.target - camera.eye).normalize();
        assert_relative_eq!(ray.direction, to_target, epsilon = 1e-3);

        assert!(screen_to_ray((0.0, 0.0), (0.0, 600.0), &camera).is_none());
    }

    #[test]
    fn test_projected_point_lies_on_ray() {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.5)
            .apply_drag((120.0, -40.0), 0.005);
        let size = (1200.0, 800.0);
        let point = Vector3::new(7.0, 1.2, -4.0);

        let clip = camera.build_view_projection_matrix() * point.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc.z), "depth {} outside 0..1", ndc.z);

        let pixel = ((ndc.x + 1.0) * 0.5 * size.0, (1.0 - ndc.y) * 0.5 * size.1);
        let ray = screen_to_ray(pixel, size, &camera).unwrap();

        let to_point = point - ray.origin;
        assert!(to_point.dot(ray.direction) > 0.0);
        let miss = to_point.cross(ray.direction).magnitude();
        assert!(miss < 0.05, "ray misses the projected point by {}", miss);
    }

    #[test]
    fn test_click_threshold() {
        let mut tracker = ClickTracker::new(5.0);
        tracker.press((100.0, 100.0));
        assert!(tracker.release((101.0, 101.0)));

        tracker.press((100.0, 100.0));
        assert!(!tracker.release((200.0, 200.0)));

        assert!(!tracker.release((100.0, 100.0)));
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = Selection::default();

        let change = selection.apply_pick(Some(2));
        assert_eq!(change, SelectionChange { previous: None, current: Some(2) });

        let change = selection.apply_pick(Some(2));
        assert_eq!(change.current, None);
        assert!(change.changed());

        selection.apply_pick(Some(2));
        assert_eq!(selection.apply_pick(Some(5)).current, Some(5));
        assert_eq!(selection.apply_pick(None).current, None);
        assert!(!selection.apply_pick(None).changed());
    }
}
