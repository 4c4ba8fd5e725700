//! Seeded random streams for chunk and catalog generation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Combine the world seed with a chunk coordinate into a well-mixed u64.
///
/// SipHash via `DefaultHasher::new()`, which uses fixed keys, so the result
/// is stable across runs.
pub fn derive_chunk_seed(world_seed: u64, x: i32, z: i32) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    x.hash(&mut hasher);
    z.hash(&mut hasher);
    hasher.finish()
}

/// Random stream for generating chunk `(x, z)`.
pub fn chunk_rng(world_seed: u64, x: i32, z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(world_seed, x, z))
}

/// Random stream that draws the per-archetype seeds of the prop catalog.
pub fn catalog_rng(world_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(world_seed ^ 0x5EED_CA7A_1060_0000)
}
