//! View-frustum culling of chunk bounding boxes.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// An axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box covering a square ground tile with origin `(x, z)` and edge
    /// `size`, spanning heights `[min_y, max_y]`.
    pub fn from_tile(x: f32, z: f32, size: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min: Vec3::new(x, min_y, z),
            max: Vec3::new(x + size, max_y, z + size),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Six inward-facing planes `(n, d)` with `n · p + d >= 0` inside.
#[derive(Clone, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Griggs-Hartmann extraction from a reverse-Z view-projection matrix.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        // Depth runs 1 at near to 0 at far, so z >= 0 is the far plane and
        // z <= w the near plane.
        planes[NEAR] = rows[3] - rows[2];
        planes[FAR] = rows[2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    pub fn from_camera(camera: &Camera) -> Self {
        Self::from_view_projection(&camera.view_projection_matrix())
    }

    /// Conservative box test: true if any part of `aabb` may be inside.
    ///
    /// For each plane only the corner furthest along the normal is checked.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let n = plane.truncate();
            let p = Vec3::select(n.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            n.dot(p) + plane.w >= 0.0
        })
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_north() -> Frustum {
        let camera = Camera {
            position: Vec3::new(0.0, 100.0, 0.0),
            far: 5000.0,
            ..Camera::default()
        };
        Frustum::from_camera(&camera)
    }

    #[test]
    fn test_tile_ahead_visible() {
        let f = looking_north();
        let tile = Aabb::from_tile(-512.0, -1500.0, 1024.0, 0.0, 200.0);
        assert!(f.is_visible(&tile));
    }

    #[test]
    fn test_tile_behind_culled() {
        let f = looking_north();
        let tile = Aabb::from_tile(-512.0, 500.0, 1024.0, 0.0, 200.0);
        assert!(!f.is_visible(&tile));
    }

    #[test]
    fn test_tile_far_to_the_side_culled() {
        let f = looking_north();
        let tile = Aabb::from_tile(4000.0, -1200.0, 1024.0, 0.0, 200.0);
        assert!(!f.is_visible(&tile));
    }

    #[test]
    fn test_tile_beyond_far_plane_culled() {
        let f = looking_north();
        let tile = Aabb::from_tile(-512.0, -9000.0, 1024.0, 0.0, 200.0);
        assert!(!f.is_visible(&tile));
    }

    #[test]
    fn test_tile_under_camera_straddling_visible() {
        let f = looking_north();
        // The tile the camera stands over reaches in front of it.
        let tile = Aabb::from_tile(-512.0, -512.0, 1024.0, 0.0, 200.0);
        assert!(f.is_visible(&tile));
    }

    #[test]
    fn test_point_containment() {
        let f = looking_north();
        assert!(f.contains_point(Vec3::new(0.0, 100.0, -50.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 100.0, 50.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 100.0, -0.5)));
    }

    #[test]
    fn test_aabb_helpers() {
        let b = Aabb::from_tile(0.0, 0.0, 10.0, -2.0, 2.0);
        assert_eq!(b.center(), Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(b.extents(), Vec3::new(5.0, 2.0, 5.0));
        assert!(b.contains(Vec3::new(10.0, 2.0, 0.0)));
        assert!(!b.contains(Vec3::new(10.1, 0.0, 0.0)));
    }
}
