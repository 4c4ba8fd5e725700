//! A scripted flight path over the terrain.

use aerie_render::Camera;
use glam::Vec3;

/// Height kept above the ground under the aircraft.
pub const MIN_CLEARANCE: f32 = 120.0;

/// Nose-down attitude of the chase camera, in radians.
const CAMERA_PITCH: f32 = -0.15;

pub struct Flight {
    position: Vec3,
    /// Radians, 0 flies towards -z.
    heading: f32,
    speed: f32,
    cruise_altitude: f32,
    time: f32,
}

impl Flight {
    pub fn new(start: Vec3, heading: f32, speed: f32) -> Self {
        Self {
            position: start,
            heading,
            speed,
            cruise_altitude: start.y,
            time: 0.0,
        }
    }

    /// Advance `dt` seconds. `ground` gives the terrain height at `(x, z)`.
    pub fn step(&mut self, dt: f32, ground: impl Fn(f32, f32) -> f32) {
        self.time += dt;
        // Slow S-turns.
        self.heading += (self.time * 0.1).sin() * 0.15 * dt;
        let direction = Vec3::new(-self.heading.sin(), 0.0, -self.heading.cos());
        self.position += direction * self.speed * dt;

        let floor = ground(self.position.x, self.position.z) + MIN_CLEARANCE;
        self.position.y = self.cruise_altitude.max(floor);
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.position, self.heading, CAMERA_PITCH)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }
}
