//! Blend curves that hide LOD changes.
//!
//! Ground grows out of the sea plane at the view edge, vegetation batches
//! rise out of the ground as detail increases, fog thickens with distance,
//! and props switch between model tiers and billboards at fixed lod cuts.
//! All of these are pure functions of `lod` and distance, so a chunk at a
//! fixed distance never flickers between states.

/// Discrete vegetation batches per chunk.
pub const VEGETATION_LOD: usize = 3;

/// Detail tiers per prop archetype.
pub const LOD_LEVELS: usize = 3;

/// Below this lod props are drawn as billboards.
pub const PROP_DETAIL_THRESHOLD: f32 = 0.4;

/// Cubic Hermite smoothing of `t` clamped to `[0, 1]`.
pub fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quadratic ease-out of `t` clamped to `[0, 1]`.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Vertical scale of the ground mesh.
pub fn ground_scale(lod: f32) -> f32 {
    ease_out(lod * 2.0)
}

/// Continuous vegetation level in `[0, VEGETATION_LOD]`.
pub fn vegetation_level(lod: f32) -> f32 {
    (lod * 0.9 + 0.11).clamp(0.0, 1.0) * VEGETATION_LOD as f32
}

/// How many vegetation batches are drawn at `level`.
pub fn vegetation_batches(level: f32) -> usize {
    (level.ceil().max(0.0) as usize).min(VEGETATION_LOD)
}

/// How far batch `batch` has grown out of the ground at `level`, in `[0, 1]`.
pub fn batch_growth(level: f32, batch: usize) -> f32 {
    ease_out(level - batch as f32)
}

/// Vertical offset of batch `batch`: `-depth` when just appearing, 0 when
/// fully grown.
pub fn batch_offset(level: f32, batch: usize, depth: f32) -> f32 {
    -(1.0 - batch_growth(level, batch)) * depth
}

/// Exponential fog attenuation in `[0, 1]`.
pub fn fog_blend(density: f32, distance: f32) -> f32 {
    (1.0 - (-density * distance).exp()).clamp(0.0, 1.0)
}

/// How props in a chunk are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropDetail {
    /// Full models of the given tier, 0 coarsest.
    Model(usize),
    /// Camera-facing quads.
    Billboard,
}

pub fn prop_detail(lod: f32) -> PropDetail {
    let t = (lod - PROP_DETAIL_THRESHOLD) / (1.0 - PROP_DETAIL_THRESHOLD);
    if t > 0.0 {
        let tier = (t * LOD_LEVELS as f32).floor() as usize;
        PropDetail::Model(tier.min(LOD_LEVELS - 1))
    } else {
        PropDetail::Billboard
    }
}
