//! One square tile of terrain: ground mesh, buildings and vegetation batches.

use std::f32::consts::TAU;

use aerie_config::DetailConfig;
use aerie_lod::{LOD_LEVELS, VEGETATION_LOD};
use aerie_mesh::{AtlasRegion, Mesh, Vertex, push_cross_billboard};
use aerie_render::{Aabb, MaterialId};
use glam::{Mat4, Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::building::BUILDING_STEM;
use crate::heightfield::Heightfield;
use crate::node::{CITY, DRY, TerrainNode};
use crate::props::{Prop, PropCatalog, PropType};
use crate::seed::chunk_rng;

/// Ground texture repeats per chunk edge.
pub const TEXTURE_TILING: f32 = 16.0;
/// Buildings are not placed below this height.
pub const PROP_WATER_LINE: f32 = 4.0;
/// Buildings thin out towards this height and stop above it.
pub const PROP_CEILING: f32 = 900.0;
/// Steepest ground (rise over run) a building is placed on.
pub const PROP_SLOPE_LIMIT: f32 = 0.35;
/// Ground flatter than this may carry townhouses and highrises.
pub const FLAT_SLOPE: f32 = 0.08;
/// Vegetation below which ground counts as urban.
pub const URBAN_VEGETATION: f32 = 0.3;
pub const HIGHRISE_CHANCE: f32 = 0.05;
/// How far a placed building sits below the sampled ground height.
pub const PROP_SINK: f32 = 1.0;
/// Trees are not placed below this height.
pub const TREE_LINE: f32 = 2.0;
pub const TREE_MIN_HEIGHT: f32 = 8.0;
pub const TREE_MAX_HEIGHT: f32 = 16.0;
/// Depth vegetation batches grow in from.
pub const TREE_SINK: f32 = 24.0;
/// Tree atlas tiles per edge.
pub const TREE_ATLAS_TILES: u32 = 2;

/// Shared state chunk generation reads from.
pub struct GenerationContext<'a> {
    pub heightfield: &'a Heightfield,
    pub catalog: &'a PropCatalog,
    pub detail: &'a DetailConfig,
    pub world_seed: u64,
    /// Material of the ground mesh.
    pub material: MaterialId,
}

pub struct TerrainChunk {
    coord: (i32, i32),
    origin: Vec3,
    material: MaterialId,
    ground: Mesh,
    props: Vec<Prop>,
    forest: [Mesh; VEGETATION_LOD],
    bounds: Aabb,
}

impl TerrainChunk {
    /// World units per chunk edge.
    pub const SIZE: f32 = 1024.0;

    /// Chunk coordinate containing world coordinate `w` (floor division).
    pub fn coord_of(w: f32) -> i32 {
        (w / Self::SIZE).floor() as i32
    }

    /// Build chunk `(x, z)` (chunk coordinates).
    pub fn generate(x: i32, z: i32, ctx: &GenerationContext<'_>) -> Self {
        let mut rng = chunk_rng(ctx.world_seed, x, z);
        let origin = Vec3::new(x as f32 * Self::SIZE, 0.0, z as f32 * Self::SIZE);
        let mut chunk = Self {
            coord: (x, z),
            origin,
            material: ctx.material,
            ground: Mesh::new(),
            props: Vec::new(),
            forest: std::array::from_fn(|_| Mesh::new()),
            bounds: Aabb::from_tile(origin.x, origin.z, Self::SIZE, 0.0, 0.0),
        };

        chunk.generate_ground(ctx.heightfield, ctx.detail.terrain);
        chunk.generate_props(&mut rng, ctx);
        chunk.ground.clip_below(0.0);
        chunk.ground.compose();
        chunk.generate_forest(&mut rng, ctx.heightfield, ctx.detail.vegetation);
        chunk.bounds = chunk.measure_bounds();

        debug!(
            "Generated chunk ({}, {}): {} ground tris, {} props, {} trees",
            x,
            z,
            chunk.ground.triangle_count(),
            chunk.props.len(),
            chunk.forest[VEGETATION_LOD - 1].triangle_count() / 4
        );
        chunk
    }

    fn generate_ground(&mut self, heightfield: &Heightfield, subdivisions: u32) {
        let subdiv = subdivisions.max(1);
        let step = Self::SIZE / subdiv as f32;
        self.ground = Mesh::with_capacity((subdiv * subdiv * 2) as usize);

        let sample = |lx: f32, lz: f32| {
            let node = heightfield.at(self.origin.x + lx, self.origin.z + lz);
            let uv = [lx / Self::SIZE * TEXTURE_TILING, lz / Self::SIZE * TEXTURE_TILING];
            Vertex::new([lx, node.height, lz], uv).with_weights(node.texture)
        };

        let mut quads = Vec::with_capacity((subdiv * subdiv) as usize);
        for j in 0..subdiv {
            for i in 0..subdiv {
                let (x0, z0) = (i as f32 * step, j as f32 * step);
                let (x1, z1) = (x0 + step, z0 + step);
                quads.push([
                    sample(x0, z0),
                    sample(x1, z0),
                    sample(x1, z1),
                    sample(x0, z1),
                ]);
            }
        }
        for quad in quads {
            self.ground.push_quad(quad);
        }
    }

    fn generate_props(&mut self, rng: &mut ChaCha8Rng, ctx: &GenerationContext<'_>) {
        let hf = ctx.heightfield;
        for _ in 0..ctx.detail.props {
            let lx = rng.random_range(0.0..Self::SIZE);
            let lz = rng.random_range(0.0..Self::SIZE);
            let (wx, wz) = (self.origin.x + lx, self.origin.z + lz);
            let node = hf.at(wx, wz);
            if node.height < PROP_WATER_LINE {
                continue;
            }
            let slope = slope_at(hf, wx, wz);
            if slope > PROP_SLOPE_LIMIT {
                continue;
            }
            // Sparser with altitude and away from settled ground.
            let settled = node.texture[CITY] + node.texture[DRY] * 0.5;
            let keep = settled * (1.0 - node.height / PROP_CEILING).clamp(0.0, 1.0);
            if rng.random::<f32>() > keep {
                continue;
            }

            let kind = if node.vegetation < URBAN_VEGETATION && slope < FLAT_SLOPE {
                if rng.random::<f32>() < HIGHRISE_CHANCE {
                    PropType::Highrise
                } else {
                    PropType::Townhouse
                }
            } else {
                PropType::House
            };
            let Some(models) = ctx.catalog.get_prop(rng, kind) else {
                continue;
            };
            let Some(best) = ctx.catalog.resolve(models[LOD_LEVELS - 1]) else {
                continue;
            };

            let yaw = rng.random_range(0.0..TAU);
            let anchor = Vec3::new(lx, node.height - PROP_SINK, lz);
            self.props.push(Prop {
                kind,
                models,
                transform: Mat4::from_translation(anchor) * Mat4::from_rotation_y(yaw),
                anchor,
                billboard_scale: Vec2::new(best.footprint.max_element(), best.height + PROP_SINK),
            });
        }
    }

    /// Build the vegetation batches; batch `i` tries `(i + 1) * density`
    /// trees.
    pub fn generate_forest(&mut self, rng: &mut ChaCha8Rng, heightfield: &Heightfield, density: u32) {
        let origin = self.origin;
        for (lod, slot) in self.forest.iter_mut().enumerate() {
            let count = (lod + 1) * density as usize;
            let mut mesh = Mesh::with_capacity(count * 4);
            for _ in 0..count {
                let lx = rng.random_range(0.0..Self::SIZE);
                let lz = rng.random_range(0.0..Self::SIZE);
                let node = heightfield.at(origin.x + lx, origin.z + lz);
                if node.height < TREE_LINE || rng.random::<f32>() > node.vegetation {
                    continue;
                }
                let height = rng.random_range(TREE_MIN_HEIGHT..TREE_MAX_HEIGHT);
                let region = AtlasRegion::tile(
                    rng.random_range(0..TREE_ATLAS_TILES * TREE_ATLAS_TILES),
                    TREE_ATLAS_TILES,
                    rng.random_range(0..4),
                );
                push_cross_billboard(
                    &mut mesh,
                    Vec3::new(lx, node.height, lz),
                    height * 0.7,
                    height,
                    region,
                );
            }
            mesh.compose();
            *slot = mesh;
        }
    }

    fn measure_bounds(&self) -> Aabb {
        let mut top: f32 = 1.0;
        for mesh in std::iter::once(&self.ground).chain(self.forest.iter()) {
            if let Some((_, hi)) = mesh.bounds() {
                top = top.max(hi.y);
            }
        }
        for prop in &self.props {
            top = top.max(prop.anchor.y + prop.billboard_scale.y);
        }
        let bottom = -(TREE_SINK.max(BUILDING_STEM + PROP_SINK));
        Aabb::from_tile(self.origin.x, self.origin.z, Self::SIZE, bottom, top)
    }

    /// Chunk coordinates.
    pub fn coord(&self) -> (i32, i32) {
        self.coord
    }

    /// World position of the chunk's minimum corner at sea level.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Ground mesh in chunk-local coordinates.
    pub fn ground(&self) -> &Mesh {
        &self.ground
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn forest(&self) -> &[Mesh; VEGETATION_LOD] {
        &self.forest
    }

    /// World-space bounds, including the depth vegetation grows in from.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

/// Steepest rise over run across one node spacing.
fn slope_at(hf: &Heightfield, x: f32, z: f32) -> f32 {
    let d = TerrainNode::SIZE;
    let dx = hf.at(x + d, z).height - hf.at(x - d, z).height;
    let dz = hf.at(x, z + d).height - hf.at(x, z - d).height;
    dx.abs().max(dz.abs()) / (2.0 * d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BoxMassing;
    use crate::loader::build_heightfield;
    use image::{GrayImage, Luma};

    struct World {
        heightfield: Heightfield,
        catalog: PropCatalog,
        detail: DetailConfig,
    }

    impl World {
        fn uniform(height_luma: u8, veg_luma: u8) -> Self {
            // Three chunks across; chunk (1, 1) is clear of the abyss border.
            let hm = GrayImage::from_pixel(96, 96, Luma([height_luma]));
            let veg = GrayImage::from_pixel(8, 8, Luma([veg_luma]));
            let mut catalog = PropCatalog::new();
            catalog.preload(7, &BoxMassing);
            Self {
                heightfield: build_heightfield(&hm, &veg),
                catalog,
                detail: DetailConfig::default(),
            }
        }

        fn ctx(&self) -> GenerationContext<'_> {
            GenerationContext {
                heightfield: &self.heightfield,
                catalog: &self.catalog,
                detail: &self.detail,
                world_seed: 99,
                material: MaterialId(1),
            }
        }
    }

    #[test]
    fn test_coord_of_floors() {
        assert_eq!(TerrainChunk::coord_of(0.0), 0);
        assert_eq!(TerrainChunk::coord_of(1023.9), 0);
        assert_eq!(TerrainChunk::coord_of(1024.0), 1);
        assert_eq!(TerrainChunk::coord_of(-0.5), -1);
        assert_eq!(TerrainChunk::coord_of(-1024.0), -1);
        assert_eq!(TerrainChunk::coord_of(-1024.5), -2);
    }

    #[test]
    fn test_ground_clipped_and_composed() {
        let world = World::uniform(60, 20);
        let chunk = TerrainChunk::generate(0, 0, &world.ctx());
        let ground = chunk.ground();
        assert!(ground.is_composed());
        assert!(!ground.is_empty());
        // The map edge falls into the abyss and is clipped away.
        assert!(ground.triangle_count() > 0);
        let (lo, _) = ground.bounds().unwrap();
        assert!(lo.x > 0.0 || lo.z > 0.0);
        assert!(ground.vertices().iter().all(|v| v.position[1] >= 0.0));
        let (lo, hi) = ground.bounds().unwrap();
        assert!(lo.x >= 0.0 && hi.x <= TerrainChunk::SIZE);
        assert!(lo.z >= 0.0 && hi.z <= TerrainChunk::SIZE);
    }

    #[test]
    fn test_full_ground_grid_when_above_water() {
        let world = World::uniform(60, 20);
        let chunk = TerrainChunk::generate(1, 1, &world.ctx());
        let subdiv = world.detail.terrain as usize;
        assert_eq!(chunk.ground().triangle_count(), subdiv * subdiv * 2);
        for v in chunk.ground().vertices() {
            let w: f32 = v.weights.iter().sum();
            assert!((w - 1.0).abs() < 1e-4);
            assert!((v.position[1] - 135.294).abs() < 0.01);
        }
    }

    #[test]
    fn test_open_sea_is_empty() {
        let world = World::uniform(0, 200);
        let chunk = TerrainChunk::generate(0, 0, &world.ctx());
        assert!(chunk.ground().is_empty());
        assert!(chunk.props().is_empty());
        assert!(chunk.forest().iter().all(Mesh::is_empty));
    }

    #[test]
    fn test_props_placed_on_dry_land() {
        let world = World::uniform(60, 20);
        let chunk = TerrainChunk::generate(1, 1, &world.ctx());
        assert!(!chunk.props().is_empty());
        for prop in chunk.props() {
            let ground = prop.anchor.y + PROP_SINK;
            assert!(ground >= PROP_WATER_LINE);
            assert!(prop.kind != PropType::House, "flat urban ground holds larger buildings");
            for h in prop.models {
                assert!(world.catalog.resolve(h).is_some());
            }
            assert!(prop.billboard_scale.x > 0.0 && prop.billboard_scale.y > 0.0);
        }
    }

    #[test]
    fn test_forest_batches_grow() {
        let world = World::uniform(80, 230);
        let chunk = TerrainChunk::generate(1, 1, &world.ctx());
        let counts: Vec<usize> = chunk.forest().iter().map(Mesh::triangle_count).collect();
        assert!(counts[0] > 0);
        assert!(counts[0] < counts[1] && counts[1] < counts[2]);
        for mesh in chunk.forest() {
            assert!(mesh.is_composed());
            assert!(mesh.vertices().iter().all(|v| v.position[1] >= TREE_LINE));
        }
    }

    #[test]
    fn test_generation_reproducible_per_seed() {
        let world = World::uniform(60, 120);
        let a = TerrainChunk::generate(1, 0, &world.ctx());
        let b = TerrainChunk::generate(1, 0, &world.ctx());
        assert_eq!(a.props().len(), b.props().len());
        assert_eq!(a.forest()[2].vertices(), b.forest()[2].vertices());
        let c = TerrainChunk::generate(0, 1, &world.ctx());
        assert_ne!(a.forest()[2].vertices(), c.forest()[2].vertices());
    }

    #[test]
    fn test_bounds_cover_content() {
        let world = World::uniform(60, 120);
        let chunk = TerrainChunk::generate(1, 1, &world.ctx());
        let b = chunk.bounds();
        assert_eq!(b.min.x, TerrainChunk::SIZE);
        assert_eq!(b.max.z, 2.0 * TerrainChunk::SIZE);
        for prop in chunk.props() {
            assert!(prop.anchor.y + prop.billboard_scale.y <= b.max.y);
        }
        assert_eq!(chunk.material(), MaterialId(1));
    }
}
