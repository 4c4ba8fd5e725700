//! One heightfield sample.

/// Ground texture channels, in weight order.
pub const CITY: usize = 0;
pub const DRY: usize = 1;
pub const FOREST: usize = 2;
pub const HIGHLAND: usize = 3;

/// Height at which highland texture starts to appear.
const HIGHLAND_START: f32 = 400.0;
/// Height over which highland fades fully in.
const HIGHLAND_RAMP: f32 = 400.0;
/// Height above which no city texture is used.
const CITY_CEILING: f32 = 600.0;

/// Elevation, vegetation density and ground texture weights at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainNode {
    /// World units; negative is under water.
    pub height: f32,
    /// Density in `[0, 1]`.
    pub vegetation: f32,
    /// Weights for city, dry, forest, highland. Sum to 1.
    pub texture: [f32; 4],
}

impl Default for TerrainNode {
    fn default() -> Self {
        Self {
            height: 0.0,
            vegetation: 0.0,
            texture: [0.0, 1.0, 0.0, 0.0],
        }
    }
}

impl TerrainNode {
    /// World units between adjacent heightfield samples.
    pub const SIZE: f32 = 32.0;

    pub fn new(height: f32, vegetation: f32) -> Self {
        Self {
            height,
            vegetation,
            texture: texture_weights(height, vegetation),
        }
    }

    /// Index of the heaviest texture channel.
    pub fn dominant_texture(&self) -> usize {
        let mut best = 0;
        for i in 1..4 {
            if self.texture[i] > self.texture[best] {
                best = i;
            }
        }
        best
    }
}

/// Ground texture weights for a sample, L1-normalised.
///
/// City favours bare low ground, dry any bare ground, forest grows
/// exponentially with vegetation, highland takes over with altitude.
pub fn texture_weights(height: f32, vegetation: f32) -> [f32; 4] {
    let veg = vegetation.clamp(0.0, 1.0);
    let bare = 1.0 - veg;

    let mut w = [0.0; 4];
    w[CITY] = bare * bare * (1.0 - height / CITY_CEILING).clamp(0.0, 1.0) * 0.8;
    w[DRY] = bare * 0.6;
    w[FOREST] = veg * (veg * 2.0).exp();
    w[HIGHLAND] = ((height - HIGHLAND_START) / HIGHLAND_RAMP).clamp(0.0, 1.0);

    let sum: f32 = w.iter().sum();
    if sum > f32::EPSILON {
        w.map(|x| x / sum)
    } else {
        [0.0, 1.0, 0.0, 0.0]
    }
}
