//! Headless flyover: streams terrain chunks along a flight path and reports
//! what the renderer would draw each frame.

mod flight;

use std::path::PathBuf;

use aerie_config::{CliArgs, Config, default_config_dir};
use aerie_render::DrawBatch;
use aerie_terrain::{
    HeightmapParams, HeightmapSynth, RenderStats, Terrain, TerrainChunk, TerrainError,
    TerrainNode,
};
use clap::Parser;
use glam::Vec3;
use tracing::{debug, error, info, warn};

use crate::flight::Flight;

const FRAME_TIME: f32 = 1.0 / 60.0;
/// Frames between progress reports.
const REPORT_INTERVAL: u32 = 60;
const CRUISE_SPEED: f32 = 250.0;
const CRUISE_ALTITUDE: f32 = 900.0;
const MINIMAP_SIZE: u32 = 512;

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using ./aerie");
            PathBuf::from("aerie")
        })
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    aerie_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config, &args) {
        error!("Flyover failed: {}", e);
        std::process::exit(1);
    }
}

/// Load the configured heightmap, or synthesise one from the world seed if
/// the file does not exist.
fn load_terrain(terrain: &mut Terrain, config: &Config) -> Result<(), TerrainError> {
    let path = &config.terrain.heightmap;
    if path.exists() {
        return terrain.load(path);
    }
    warn!("Heightmap {} not found, synthesising one", path.display());
    let synth = HeightmapSynth::new(HeightmapParams {
        seed: config.terrain.seed,
        ..Default::default()
    });
    terrain.load_images(&synth.heightmap_image(), Some(&synth.vegetation_image()))
}

#[derive(Default)]
struct FlightTotals {
    generated: usize,
    draw_calls: usize,
    peak_draw_calls: usize,
    culled: usize,
}

impl FlightTotals {
    fn add(&mut self, stats: &RenderStats) {
        self.generated += stats.generated;
        self.draw_calls += stats.draw_calls;
        self.peak_draw_calls = self.peak_draw_calls.max(stats.draw_calls);
        self.culled += stats.culled;
    }
}

fn run(config: &Config, args: &CliArgs) -> Result<(), TerrainError> {
    let mut terrain = Terrain::new(config);
    load_terrain(&mut terrain, config)?;

    let heightfield = terrain.heightfield();
    let start = Vec3::new(
        heightfield.width() as f32 * TerrainNode::SIZE * 0.5,
        CRUISE_ALTITUDE,
        heightfield.height() as f32 * TerrainNode::SIZE * 0.5,
    );
    let prefetched = terrain.prefetch(start.x, start.z, 1);
    info!("Prefetched {} chunks around the start", prefetched);

    let mut flight = Flight::new(start, 0.0, CRUISE_SPEED);
    let mut batch = DrawBatch::with_capacity(4096);
    let mut totals = FlightTotals::default();
    let mut last_chunk = None;

    for frame in 1..=args.frames {
        flight.step(FRAME_TIME, |x, z| terrain.height_at(x, z));
        let position = flight.position();

        let chunk = (
            TerrainChunk::coord_of(position.x),
            TerrainChunk::coord_of(position.z),
        );
        if last_chunk != Some(chunk) {
            let bounds = *terrain.get_chunk(position.x, position.z).bounds();
            if config.debug.show_chunk_bounds {
                info!(
                    "Entered chunk ({}, {}): bounds {:?}..{:?}",
                    chunk.0, chunk.1, bounds.min, bounds.max
                );
            } else {
                debug!("Entered chunk ({}, {})", chunk.0, chunk.1);
            }
            last_chunk = Some(chunk);
        }

        batch.clear();
        let stats = terrain.render(&flight.camera(), &mut batch);
        batch.sort();
        totals.add(&stats);

        if frame % REPORT_INTERVAL == 0 {
            let groups = batch.groups().count();
            let instanced: usize = batch.groups().map(|g| g.instanced().count()).sum();
            info!(
                "Frame {}: at ({:.0}, {:.0}, {:.0}) heading {:.2}, {} chunks drawn, {} culled, {} draw calls in {} groups / {} instanced draws, {} chunks cached",
                frame,
                position.x,
                position.y,
                position.z,
                flight.heading(),
                stats.rendered,
                stats.culled,
                stats.draw_calls,
                groups,
                instanced,
                terrain.cached_chunks()
            );
        }
    }

    if let Some(bounds) = terrain.cache_bounds() {
        info!(
            "Cache rectangle {}..={} x {}..={} ({} slots, {} chunks)",
            bounds.west,
            bounds.east,
            bounds.north,
            bounds.south,
            bounds.area(),
            terrain.cached_chunks()
        );
    }
    info!(
        "Flew {} frames: {} chunks generated, {} chunk culls, {} draw calls (peak {} per frame)",
        args.frames, totals.generated, totals.culled, totals.draw_calls, totals.peak_draw_calls
    );

    if let Some(path) = &args.minimap {
        terrain.save_minimap(path, MINIMAP_SIZE)?;
    }
    Ok(())
}
