//! The square window of chunks around the camera and the continuous LOD
//! factor assigned to each of them.

use glam::Vec2;

/// Picks which chunks to draw and how detailed each one is.
///
/// The window extends `radius` chunks in every direction from the camera's
/// chunk. Chunks whose centre lies further than `radius` chunks from the
/// camera are outside the view circle and get no LOD at all.
#[derive(Clone, Debug)]
pub struct LodSelector {
    radius: i32,
    gain: f32,
}

impl LodSelector {
    /// `view_range` and `chunk_size` are in world units.
    pub fn new(view_range: f32, chunk_size: f32, gain: f32) -> Self {
        let radius = if chunk_size > 0.0 {
            (view_range / chunk_size).ceil().max(1.0) as i32
        } else {
            1
        };
        Self { radius, gain }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Chunk offsets covering the window, z outer and x inner.
    pub fn window(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let r = self.radius;
        (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| (dx, dz)))
    }

    /// LOD factor for a chunk `distance` chunks away, `None` outside the
    /// view circle.
    ///
    /// Falls linearly from `gain` at the camera to 0 at the circle edge.
    pub fn lod(&self, distance: f32) -> Option<f32> {
        let r = self.radius as f32;
        (distance <= r).then(|| (r - distance) / r * self.gain)
    }
}

/// Distance in chunk units from the camera to the centre of chunk `(x, z)`.
///
/// `camera` is the camera position already divided by the chunk size.
pub fn chunk_distance(camera: Vec2, x: i32, z: i32) -> f32 {
    camera.distance(Vec2::new(x as f32 + 0.5, z as f32 + 0.5))
}
