//! Flight camera producing view and projection matrices.

use glam::{Mat4, Vec3};

/// A perspective camera oriented by yaw and pitch.
///
/// Yaw 0 looks down -Z; positive yaw turns left (counter-clockwise seen from
/// above). The projection uses reverse-Z: near maps to depth 1, far to 0.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Heading in radians around +Y.
    pub yaw: f32,
    /// Elevation in radians, positive looks up.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20_000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        // Reverse-Z: far and near swapped.
        Mat4::perspective_rh(self.fov_y, self.aspect, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotation that turns a quad on the z = 0 plane to face this camera.
    ///
    /// Only yaw is applied so billboards stay upright.
    pub fn billboard_rotation(&self) -> Mat4 {
        Mat4::from_rotation_y(self.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
    }

    #[test]
    fn test_yaw_turns_left() {
        let cam = Camera::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2, 0.0);
        assert!((cam.forward() - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_pitch_looks_up() {
        let cam = Camera::new(Vec3::ZERO, 0.0, std::f32::consts::FRAC_PI_4);
        assert!(cam.forward().y > 0.7);
        assert!((cam.forward().length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_reverse_z_depth() {
        let cam = Camera::default();
        let vp = cam.view_projection_matrix();
        let near = vp.project_point3(Vec3::new(0.0, 0.0, -cam.near));
        let far = vp.project_point3(Vec3::new(0.0, 0.0, -cam.far));
        assert!((near.z - 1.0).abs() < 1e-3);
        assert!(far.z.abs() < 1e-3);
    }

    #[test]
    fn test_billboard_faces_camera() {
        let cam = Camera::new(Vec3::ZERO, 0.7, 0.3);
        let normal = cam.billboard_rotation().transform_vector3(Vec3::Z);
        let flat = Vec3::new(cam.forward().x, 0.0, cam.forward().z).normalize();
        assert!((normal + flat).length() < 1e-4);
    }
}
