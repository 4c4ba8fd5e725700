//! Level-of-detail policy for terrain chunks: which chunks are in view, how
//! detailed each one is, and the curves that blend between detail levels.

mod blend;
mod selector;

pub use blend::{
    LOD_LEVELS, PROP_DETAIL_THRESHOLD, PropDetail, VEGETATION_LOD, batch_growth, batch_offset,
    ease_out, fog_blend, ground_scale, prop_detail, smooth_step, vegetation_batches,
    vegetation_level,
};
pub use selector::{LodSelector, chunk_distance};
