//! Streaming terrain for the flight simulator: an image-driven heightfield,
//! a procedural building catalog, a growable chunk cache, per-chunk ground,
//! prop and vegetation generation, and continuous-LOD chunk rendering.

mod building;
mod cache;
mod chunk;
mod chunk_render;
mod error;
mod heightfield;
mod heightmap;
mod loader;
mod minimap;
mod node;
mod props;
mod seed;
mod shaders;
mod terrain;

pub use building::{BUILDING_STEM, BoxMassing, BuildingGenerator, BuildingParams, Model, RoofKind};
pub use cache::{CacheBounds, ChunkCache};
pub use chunk::{GenerationContext, TerrainChunk};
pub use chunk_render::{ChunkMaterials, ChunkPrograms, RenderContext};
pub use error::TerrainError;
pub use heightfield::Heightfield;
pub use heightmap::{HeightmapParams, HeightmapSynth};
pub use loader::{
    ABYSS_HEIGHT, HEIGHT_SCALE, SEA_LEVEL_OFFSET, abyss_border, build_heightfield, load_gray,
};
pub use minimap::render_minimap;
pub use node::{CITY, DRY, FOREST, HIGHLAND, TerrainNode, texture_weights};
pub use props::{ARCHETYPES, Prop, PropCatalog, PropHandle, PropType};
pub use seed::{chunk_rng, derive_chunk_seed};
pub use terrain::{RenderStats, Terrain, TerrainSettings, TerrainState};
