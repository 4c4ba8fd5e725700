//! The prop model catalog and the prop instances placed in chunks.
//!
//! The catalog owns every generated model. Chunks hold [`PropHandle`]s,
//! which carry the catalog generation they were issued under, so a handle
//! that outlives a regeneration resolves to `None` instead of to a model of
//! some other building.

use aerie_lod::LOD_LEVELS;
use glam::{Mat4, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::building::{BuildingGenerator, BuildingParams, Model, RoofKind};
use crate::seed::catalog_rng;

/// Number of archetypes generated per building type.
pub const ARCHETYPES: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropType {
    House,
    Townhouse,
    Highrise,
    Tree,
    Shrub,
}

impl PropType {
    pub const COUNT: usize = 5;
    pub const ALL: [PropType; Self::COUNT] = [
        PropType::House,
        PropType::Townhouse,
        PropType::Highrise,
        PropType::Tree,
        PropType::Shrub,
    ];
    /// Types the catalog generates building models for.
    pub const BUILDINGS: [PropType; 3] = [PropType::House, PropType::Townhouse, PropType::Highrise];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Hall size range (min, max) and maximum wing count.
    fn dimensions(self) -> (Vec3, Vec3, u32) {
        match self {
            PropType::House => (Vec3::new(8.0, 5.0, 8.0), Vec3::new(16.0, 9.0, 14.0), 2),
            PropType::Townhouse => (Vec3::new(10.0, 10.0, 10.0), Vec3::new(20.0, 20.0, 18.0), 3),
            PropType::Highrise => (Vec3::new(16.0, 40.0, 16.0), Vec3::new(30.0, 120.0, 30.0), 4),
            PropType::Tree | PropType::Shrub => (Vec3::splat(2.0), Vec3::splat(4.0), 0),
        }
    }
}

impl BuildingParams {
    /// Parameters for detail tier `tier` of a building of `kind`.
    ///
    /// Draws the same values in the same order for every tier, so a
    /// freshly seeded `rng` yields one silhouette at every detail level.
    /// Tier 0 has a flat roof and no wings, tier 1 a pyramid roof, higher
    /// tiers a random roof.
    pub fn for_tier(kind: PropType, tier: usize, rng: &mut ChaCha8Rng) -> Self {
        let (lo, hi, max_wings) = kind.dimensions();
        let size = Vec3::new(
            rng.random_range(lo.x..=hi.x),
            rng.random_range(lo.y..=hi.y),
            rng.random_range(lo.z..=hi.z),
        );
        let wings = rng.random_range(0..=max_wings);
        let style = char::from(b'a' + rng.random_range(0..4u8));
        let corner_rounding = rng.random_range(0.0..1.5);
        let best_roof = RoofKind::random(rng);

        let (roof, wings) = match tier {
            0 => (RoofKind::Flat, 0),
            1 => (RoofKind::Pyramid, wings),
            _ => (best_roof, wings),
        };
        Self {
            size,
            wings,
            roof,
            style,
            corner_rounding,
        }
    }
}

/// Non-owning reference to a catalog model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropHandle {
    pub kind: PropType,
    pub index: usize,
    pub generation: u32,
}

/// Generated building models, grouped by type in runs of [`LOD_LEVELS`]
/// (coarsest first).
pub struct PropCatalog {
    models: [Vec<Model>; PropType::COUNT],
    generation: u32,
}

impl Default for PropCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PropCatalog {
    pub fn new() -> Self {
        Self {
            models: std::array::from_fn(|_| Vec::new()),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop every model. Outstanding handles stop resolving.
    pub fn clear(&mut self) {
        for list in &mut self.models {
            list.clear();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Regenerate the catalog from scratch.
    ///
    /// Each archetype draws one seed from the world stream; every tier of
    /// every building type for that archetype reseeds from it.
    pub fn preload(&mut self, world_seed: u64, generator: &dyn BuildingGenerator) {
        self.clear();
        let mut seeds = catalog_rng(world_seed);
        for _ in 0..ARCHETYPES {
            let seed: u64 = seeds.random();
            for kind in PropType::BUILDINGS {
                for tier in 0..LOD_LEVELS {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    let params = BuildingParams::for_tier(kind, tier, &mut rng);
                    let mut model = generator.generate(&mut rng, &params);
                    model.seed = seed;
                    model.mesh.compose();
                    self.models[kind.index()].push(model);
                }
            }
        }
        info!(
            "Generated prop catalog: {} models (generation {})",
            self.len(),
            self.generation
        );
    }

    pub fn count(&self, kind: PropType) -> usize {
        self.models[kind.index()].len()
    }

    pub fn len(&self) -> usize {
        self.models.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.models.iter().all(Vec::is_empty)
    }

    /// Handles to every detail tier of one random archetype of `kind`, or
    /// `None` if no model of that type exists.
    pub fn get_prop(
        &self,
        rng: &mut ChaCha8Rng,
        kind: PropType,
    ) -> Option<[PropHandle; LOD_LEVELS]> {
        let count = self.count(kind);
        if count == 0 {
            return None;
        }
        let base = rng.random_range(0..count) / LOD_LEVELS * LOD_LEVELS;
        Some(std::array::from_fn(|tier| PropHandle {
            kind,
            index: base + tier,
            generation: self.generation,
        }))
    }

    pub fn resolve(&self, handle: PropHandle) -> Option<&Model> {
        if handle.generation != self.generation {
            return None;
        }
        self.models[handle.kind.index()].get(handle.index)
    }
}

/// One placed building.
#[derive(Clone, Debug)]
pub struct Prop {
    pub kind: PropType,
    /// Detail tiers, coarsest first.
    pub models: [PropHandle; LOD_LEVELS],
    /// Full-size placement relative to the chunk origin.
    pub transform: Mat4,
    /// Base of the billboard stand-in relative to the chunk origin.
    pub anchor: Vec3,
    /// Billboard width and height.
    pub billboard_scale: Vec2,
}

impl Prop {
    /// Billboard placement turned by a camera's `rotation`.
    pub fn billboard_transform(&self, rotation: Mat4) -> Mat4 {
        Mat4::from_translation(self.anchor)
            * rotation
            * Mat4::from_scale(Vec3::new(self.billboard_scale.x, self.billboard_scale.y, 1.0))
    }
}
