//! The terrain service: heightfield, prop catalog, chunk cache and the
//! shared materials, with an explicit load/reset lifecycle.

use std::path::Path;

use aerie_config::{Config, DetailConfig, TerrainConfig};
use aerie_lod::{LodSelector, chunk_distance};
use aerie_mesh::{Mesh, unit_billboard};
use aerie_render::{
    Aabb, Camera, DrawBatch, Frustum, Material, ProgramCache, RenderError, TextureCache,
};
use glam::Vec2;
use image::{GrayImage, RgbaImage};
use tracing::{debug, error, info, warn};

use crate::building::{BoxMassing, BuildingGenerator};
use crate::cache::{CacheBounds, ChunkCache};
use crate::chunk::{GenerationContext, TREE_SINK, TerrainChunk};
use crate::chunk_render::{ChunkMaterials, ChunkPrograms, RenderContext};
use crate::error::TerrainError;
use crate::heightfield::Heightfield;
use crate::loader::{build_heightfield, load_gray, neutral_vegetation, placeholder_heightmap};
use crate::minimap::render_minimap;
use crate::node::TerrainNode;
use crate::props::PropCatalog;
use crate::shaders::{
    BILLBOARD_FS, BILLBOARD_VS, GROUND_FS, GROUND_VS, PROPS_FS, PROPS_VS, TREES_FS, TREES_VS,
    register_terrain_shaders,
};

/// Headroom above the highest ground for the coarse pre-generation cull.
/// Covers the tallest highrise and tree.
const CULL_HEADROOM: f32 = 160.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainState {
    Unloaded,
    Loaded,
}

/// The parts of [`Config`] the terrain reads.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    pub view_range: f32,
    pub fog_density: f32,
    pub lod_gain: f32,
    pub detail: DetailConfig,
    pub assets: TerrainConfig,
}

impl TerrainSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            view_range: config.video.view_range,
            fog_density: config.video.fog_density,
            lod_gain: config.video.lod_gain,
            detail: config.video.detail.clone(),
            assets: config.terrain.clone(),
        }
    }
}

/// Counters from one [`Terrain::render`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Window slots inspected.
    pub visited: usize,
    /// Slots outside the view circle.
    pub out_of_range: usize,
    /// Slots rejected by the frustum.
    pub culled: usize,
    /// Chunks generated this frame.
    pub generated: usize,
    pub rendered: usize,
    pub draw_calls: usize,
}

/// Materials every chunk draws with.
struct TerrainMaterials {
    ground: Material,
    trees: Material,
    props: Material,
    billboard: Material,
}

impl TerrainMaterials {
    fn new() -> Self {
        Self {
            ground: Material::new("terrain_ground"),
            trees: Material::new("terrain_trees"),
            props: Material::new("terrain_props"),
            billboard: Material::new("terrain_billboard"),
        }
    }

    fn ids(&self) -> ChunkMaterials {
        ChunkMaterials {
            trees: self.trees.id(),
            props: self.props.id(),
            billboard: self.billboard.id(),
        }
    }

    /// Load textures and link programs. Missing textures become
    /// placeholders; only a program that fails to link is an error.
    fn compose(
        &mut self,
        programs: &mut ProgramCache,
        textures: &mut TextureCache,
        assets: &TerrainConfig,
    ) -> Result<ChunkPrograms, RenderError> {
        if !self.ground.is_composed() {
            for (slot, path) in assets.textures.iter().enumerate() {
                self.ground.set_texture(slot, textures.load(path));
            }
        }
        if !self.trees.is_composed() {
            self.trees.set_texture(0, textures.load(&assets.tree_atlas));
        }
        Ok(ChunkPrograms {
            ground: self.ground.compose(programs, GROUND_VS, GROUND_FS)?,
            trees: self.trees.compose(programs, TREES_VS, TREES_FS)?,
            props: self.props.compose(programs, PROPS_VS, PROPS_FS)?,
            billboard: self.billboard.compose(programs, BILLBOARD_VS, BILLBOARD_FS)?,
        })
    }
}

pub struct Terrain {
    state: TerrainState,
    settings: TerrainSettings,
    heightfield: Heightfield,
    catalog: PropCatalog,
    chunks: ChunkCache<TerrainChunk>,
    generator: Box<dyn BuildingGenerator>,
    programs: ProgramCache,
    textures: TextureCache,
    materials: TerrainMaterials,
    linked: Option<ChunkPrograms>,
    /// Unit quad standing in for distant buildings.
    billboard: Mesh,
    minimap: Option<RgbaImage>,
}

impl Terrain {
    pub fn new(config: &Config) -> Self {
        Self::with_generator(config, Box::new(BoxMassing))
    }

    /// A terrain whose prop catalog is built by `generator`.
    pub fn with_generator(config: &Config, generator: Box<dyn BuildingGenerator>) -> Self {
        let mut billboard = unit_billboard();
        billboard.compose();
        Self {
            state: TerrainState::Unloaded,
            settings: TerrainSettings::from_config(config),
            heightfield: Heightfield::default(),
            catalog: PropCatalog::new(),
            chunks: ChunkCache::new(),
            generator,
            programs: ProgramCache::new(),
            textures: TextureCache::new(),
            materials: TerrainMaterials::new(),
            linked: None,
            billboard,
            minimap: None,
        }
    }

    pub fn state(&self) -> TerrainState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == TerrainState::Loaded
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Tear everything down. Chunks go before the catalog so no handle
    /// outlives the models it names.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.catalog.clear();
        self.heightfield = Heightfield::default();
        self.minimap = None;
        self.textures.clear();
        self.programs = ProgramCache::new();
        self.materials = TerrainMaterials::new();
        self.linked = None;
        self.state = TerrainState::Unloaded;
        debug!("Terrain reset");
    }

    /// Load the heightmap at `path` and its vegetation mask.
    ///
    /// Missing images are logged and replaced: the heightmap by an all-abyss
    /// placeholder, the mask by a neutral one. Only a failure to link the
    /// terrain programs is returned as an error.
    pub fn load(&mut self, path: &Path) -> Result<(), TerrainError> {
        self.reset();

        let heightmap = load_gray(path).unwrap_or_else(|| {
            warn!("Using placeholder heightmap in place of {}", path.display());
            placeholder_heightmap()
        });
        let mut assets = self.settings.assets.clone();
        assets.heightmap = path.to_path_buf();
        let mask_path = assets.vegetation_mask_path();
        let vegetation = load_gray(&mask_path);
        if vegetation.is_none() {
            warn!(
                "No vegetation mask at {}, using neutral density",
                mask_path.display()
            );
        }

        self.populate(&heightmap, vegetation.as_ref())
    }

    /// Load from images already in memory. `vegetation` of `None` means a
    /// neutral mask.
    pub fn load_images(
        &mut self,
        heightmap: &GrayImage,
        vegetation: Option<&GrayImage>,
    ) -> Result<(), TerrainError> {
        self.reset();
        self.populate(heightmap, vegetation)
    }

    fn populate(
        &mut self,
        heightmap: &GrayImage,
        vegetation: Option<&GrayImage>,
    ) -> Result<(), TerrainError> {
        let neutral;
        let vegetation = match vegetation {
            Some(v) => v,
            None => {
                neutral = neutral_vegetation();
                &neutral
            }
        };
        self.heightfield = build_heightfield(heightmap, vegetation);

        register_terrain_shaders(&mut self.programs);
        let linked =
            self.materials
                .compose(&mut self.programs, &mut self.textures, &self.settings.assets);
        match linked {
            Ok(programs) => self.linked = Some(programs),
            Err(e) => {
                error!("Terrain shaders failed: {}", e);
                self.reset();
                return Err(e.into());
            }
        }

        self.catalog
            .preload(self.settings.assets.seed, self.generator.as_ref());
        self.state = TerrainState::Loaded;

        let range = self.heightfield.height_range().unwrap_or((0.0, 0.0));
        info!(
            "Terrain loaded: {}x{} nodes, heights {:.1}..{:.1}",
            self.heightfield.width(),
            self.heightfield.height(),
            range.0,
            range.1
        );
        Ok(())
    }

    pub fn heightfield(&self) -> &Heightfield {
        &self.heightfield
    }

    pub fn catalog(&self) -> &PropCatalog {
        &self.catalog
    }

    /// Interpolated node at world position `(x, z)`.
    pub fn at(&self, x: f32, z: f32) -> TerrainNode {
        self.heightfield.at(x, z)
    }

    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.at(x, z).height
    }

    /// The chunk containing world position `(x, z)`, generated on first
    /// access.
    pub fn get_chunk(&mut self, x: f32, z: f32) -> &TerrainChunk {
        let cx = TerrainChunk::coord_of(x);
        let cz = TerrainChunk::coord_of(z);
        let ctx = GenerationContext {
            heightfield: &self.heightfield,
            catalog: &self.catalog,
            detail: &self.settings.detail,
            world_seed: self.settings.assets.seed,
            material: self.materials.ground.id(),
        };
        self.chunks
            .get_or_insert_with(cx, cz, || TerrainChunk::generate(cx, cz, &ctx))
    }

    /// Whether the chunk containing world position `(x, z)` exists. Never
    /// generates.
    pub fn is_cached(&self, x: f32, z: f32) -> bool {
        self.chunks
            .contains(TerrainChunk::coord_of(x), TerrainChunk::coord_of(z))
    }

    /// Cache rectangle in chunk coordinates.
    pub fn cache_bounds(&self) -> Option<CacheBounds> {
        self.chunks.bounds()
    }

    pub fn cached_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.iter().map(|(_, chunk)| chunk)
    }

    /// Generate every chunk within `radius` chunks of world position
    /// `(x, z)`. The cache grows once to cover the whole square. Returns
    /// the number of chunks generated.
    pub fn prefetch(&mut self, x: f32, z: f32, radius: u32) -> usize {
        let cx = TerrainChunk::coord_of(x);
        let cz = TerrainChunk::coord_of(z);
        let r = radius.min(i32::MAX as u32 / 4) as i32;
        self.chunks.grow_to(CacheBounds {
            west: cx - r,
            east: cx + r,
            north: cz - r,
            south: cz + r,
        });

        let ctx = GenerationContext {
            heightfield: &self.heightfield,
            catalog: &self.catalog,
            detail: &self.settings.detail,
            world_seed: self.settings.assets.seed,
            material: self.materials.ground.id(),
        };
        let mut generated = 0;
        for z in cz - r..=cz + r {
            for x in cx - r..=cx + r {
                self.chunks.get_or_insert_with(x, z, || {
                    generated += 1;
                    TerrainChunk::generate(x, z, &ctx)
                });
            }
        }
        debug!("Prefetched {} chunks around ({}, {})", generated, cx, cz);
        generated
    }

    /// Queue every visible chunk around `camera` into `batch`, generating
    /// chunks as they come into view.
    ///
    /// Chunks are visited z outer, x inner. Nothing is drawn before a
    /// successful load.
    pub fn render(&mut self, camera: &Camera, batch: &mut DrawBatch) -> RenderStats {
        let mut stats = RenderStats::default();
        let (Some(programs), Some(billboard)) = (self.linked, self.billboard.id()) else {
            return stats;
        };

        let selector = LodSelector::new(
            self.settings.view_range,
            TerrainChunk::SIZE,
            self.settings.lod_gain,
        );
        let frustum = Frustum::from_camera(camera);
        let eye = Vec2::new(camera.position.x, camera.position.z) / TerrainChunk::SIZE;
        let (base_x, base_z) = (eye.x.floor() as i32, eye.y.floor() as i32);
        let top = self
            .heightfield
            .height_range()
            .map_or(0.0, |(_, hi)| hi.max(0.0))
            + CULL_HEADROOM;

        let gen_ctx = GenerationContext {
            heightfield: &self.heightfield,
            catalog: &self.catalog,
            detail: &self.settings.detail,
            world_seed: self.settings.assets.seed,
            material: self.materials.ground.id(),
        };
        let mut ctx = RenderContext {
            batch,
            camera,
            catalog: &self.catalog,
            programs,
            materials: self.materials.ids(),
            billboard,
            fog_density: self.settings.fog_density,
        };

        for (dx, dz) in selector.window() {
            stats.visited += 1;
            let (cx, cz) = (base_x + dx, base_z + dz);
            let distance = chunk_distance(eye, cx, cz);
            let Some(lod) = selector.lod(distance) else {
                stats.out_of_range += 1;
                continue;
            };

            // The chunk underfoot is always drawn.
            let underfoot = distance < 1.0;
            let coarse = Aabb::from_tile(
                cx as f32 * TerrainChunk::SIZE,
                cz as f32 * TerrainChunk::SIZE,
                TerrainChunk::SIZE,
                -TREE_SINK,
                top,
            );
            if !underfoot && !frustum.is_visible(&coarse) {
                stats.culled += 1;
                continue;
            }

            let chunk = self.chunks.get_or_insert_with(cx, cz, || {
                stats.generated += 1;
                TerrainChunk::generate(cx, cz, &gen_ctx)
            });
            if !underfoot && !frustum.is_visible(chunk.bounds()) {
                stats.culled += 1;
                continue;
            }
            stats.draw_calls += chunk.render(&mut ctx, distance * TerrainChunk::SIZE, lod);
            stats.rendered += 1;
        }
        stats
    }

    /// Overview image `size` pixels square, rebuilt only after a reset or a
    /// size change.
    pub fn minimap(&mut self, size: u32) -> &RgbaImage {
        let size = size.max(1);
        if self
            .minimap
            .as_ref()
            .is_some_and(|m| m.dimensions() != (size, size))
        {
            self.minimap = None;
        }
        let heightfield = &self.heightfield;
        self.minimap
            .get_or_insert_with(|| render_minimap(heightfield, size))
    }

    pub fn has_minimap(&self) -> bool {
        self.minimap.is_some()
    }

    pub fn save_minimap(&mut self, path: &Path, size: u32) -> Result<(), TerrainError> {
        self.minimap(size).save(path)?;
        info!("Wrote minimap to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "terrain_tests.rs"]
mod tests;
