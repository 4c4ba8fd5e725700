//! Tests for the terrain service: lifecycle, chunk cache, prefetch, render loop
//! and minimap.

use std::collections::HashMap;

use aerie_lod::LOD_LEVELS;
use glam::Vec3;
use image::Luma;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::node::FOREST;
use crate::props::{ARCHETYPES, PropType};

const SIZE: f32 = TerrainChunk::SIZE;

fn uniform(w: u32, h: u32, luma: u8) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([luma]))
}

fn loaded(w: u32, luma: u8, veg: u8) -> Terrain {
    let mut terrain = Terrain::new(&Config::default());
    terrain
        .load_images(&uniform(w, w, luma), Some(&uniform(8, 8, veg)))
        .unwrap();
    terrain
}

fn chunk_ptr(terrain: &mut Terrain, x: f32, z: f32) -> *const TerrainChunk {
    terrain.get_chunk(x, z)
}

#[test]
fn test_small_map_scenario() {
    let mut terrain = Terrain::new(&Config::default());
    assert_eq!(terrain.state(), TerrainState::Unloaded);
    terrain
        .load_images(&uniform(4, 4, 100), Some(&uniform(4, 4, 128)))
        .unwrap();
    assert!(terrain.is_loaded());

    let node = terrain.at(2.0 * TerrainNode::SIZE, 2.0 * TerrainNode::SIZE);
    let expected = 100.0 / 255.0 * 1000.0 - 100.0;
    assert!((node.height - expected).abs() < 1e-3, "{}", node.height);
    assert_eq!(node.dominant_texture(), FOREST);

    let first = chunk_ptr(&mut terrain, 0.0, 0.0);
    let second = chunk_ptr(&mut terrain, SIZE, 0.0);
    assert!(!std::ptr::eq(first, second));
    let bounds = terrain.cache_bounds().unwrap();
    assert!(bounds.contains(0, 0) && bounds.contains(1, 0));

    let third = chunk_ptr(&mut terrain, 0.0, 0.0);
    assert!(std::ptr::eq(first, third));
    assert_eq!(terrain.cached_chunks(), 2);
}

#[test]
fn test_chunk_coordinates_floor_negative_positions() {
    let mut terrain = loaded(16, 90, 128);
    assert_eq!(terrain.get_chunk(-1.0, -1.0).coord(), (-1, -1));
    assert_eq!(terrain.get_chunk(SIZE - 0.5, -SIZE).coord(), (0, -1));
    assert_eq!(terrain.get_chunk(-SIZE - 1.0, 0.0).coord(), (-2, 0));
    assert!(terrain.is_cached(-0.25, -1023.0));
    assert!(!terrain.is_cached(0.0, 0.0));
}

#[test]
fn test_is_cached_never_generates() {
    let terrain = loaded(16, 90, 128);
    for (x, z) in [(0.0, 0.0), (5000.0, -300.0)] {
        assert!(!terrain.is_cached(x, z));
    }
    assert!(terrain.cache_bounds().is_none());
    assert_eq!(terrain.cached_chunks(), 0);
}

#[test]
fn test_cache_identity_and_growth_over_walk() {
    let mut terrain = loaded(64, 90, 128);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut seen: HashMap<(i32, i32), *const TerrainChunk> = HashMap::new();
    let mut area = 0;

    for _ in 0..60 {
        let x = rng.random_range(-6.0..6.0) * SIZE;
        let z = rng.random_range(-6.0..6.0) * SIZE;
        let ptr = chunk_ptr(&mut terrain, x, z);
        let key = (TerrainChunk::coord_of(x), TerrainChunk::coord_of(z));
        let prev = *seen.entry(key).or_insert(ptr);
        assert!(std::ptr::eq(prev, ptr));

        let b = terrain.cache_bounds().unwrap();
        assert!(b.area() >= area);
        area = b.area();

        for (&(cx, cz), &p) in &seen {
            assert!(b.contains(cx, cz));
            assert!(b.index(cx, cz) < b.area());
            let again = chunk_ptr(
                &mut terrain,
                cx as f32 * SIZE + 1.0,
                cz as f32 * SIZE + 1.0,
            );
            assert!(std::ptr::eq(p, again));
        }
    }
    assert_eq!(terrain.cached_chunks(), seen.len());
    for chunk in terrain.chunks() {
        let (cx, cz) = chunk.coord();
        assert_eq!(chunk.origin(), Vec3::new(cx as f32 * SIZE, 0.0, cz as f32 * SIZE));
    }
}

#[test]
fn test_reset_clears_everything() {
    let mut terrain = loaded(64, 90, 128);
    let coords = [(0.0, 0.0), (SIZE * 3.0, SIZE), (-SIZE, -2.0 * SIZE)];
    for (x, z) in coords {
        terrain.get_chunk(x, z);
    }
    terrain.minimap(32);
    assert!(terrain.has_minimap());

    terrain.reset();
    assert_eq!(terrain.state(), TerrainState::Unloaded);
    for (x, z) in coords {
        assert!(!terrain.is_cached(x, z));
    }
    assert!(terrain.cache_bounds().is_none());
    assert!(terrain.heightfield().is_empty());
    assert_eq!(terrain.heightfield().width(), 0);
    assert_eq!(terrain.heightfield().height(), 0);
    for kind in PropType::ALL {
        assert_eq!(terrain.catalog().count(kind), 0);
    }
    assert!(!terrain.has_minimap());

    let mut batch = DrawBatch::new();
    let stats = terrain.render(&Camera::default(), &mut batch);
    assert_eq!(stats.visited, 0);
    assert!(batch.is_empty());
}

#[test]
fn test_reload_regenerates_catalog_and_drops_chunks() {
    let mut terrain = loaded(64, 90, 128);
    terrain.get_chunk(SIZE, SIZE);
    let generation = terrain.catalog().generation();
    assert_eq!(
        terrain.catalog().count(PropType::Townhouse),
        ARCHETYPES * LOD_LEVELS
    );

    terrain
        .load_images(&uniform(32, 32, 120), None)
        .unwrap();
    assert_ne!(terrain.catalog().generation(), generation);
    assert!(!terrain.is_cached(SIZE, SIZE));
    assert_eq!(terrain.heightfield().width(), 32);
    // No mask given: neutral density everywhere.
    let veg = terrain.at(512.0, 512.0).vegetation;
    assert!((veg - 128.0 / 255.0).abs() < 1e-5);
}

#[test]
fn test_props_resolve_against_current_catalog() {
    let mut terrain = loaded(96, 60, 40);
    let chunk = terrain.get_chunk(1.5 * SIZE, 1.5 * SIZE);
    let handles: Vec<_> = chunk.props().iter().flat_map(|p| p.models).collect();
    assert!(!handles.is_empty());
    for h in handles {
        assert!(terrain.catalog().resolve(h).is_some());
    }
}

#[test]
fn test_load_reads_png_and_vegetation_sibling() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("island.png");
    uniform(16, 16, 200).save(&path).unwrap();
    uniform(4, 4, 255)
        .save(dir.path().join("island_vegetation.png"))
        .unwrap();

    let mut terrain = Terrain::new(&Config::default());
    terrain.load(&path).unwrap();
    assert!(terrain.is_loaded());
    assert_eq!(terrain.heightfield().width(), 16);
    let node = terrain.at(8.0 * TerrainNode::SIZE, 8.0 * TerrainNode::SIZE);
    assert!((node.height - (200.0 / 255.0 * 1000.0 - 100.0)).abs() < 1e-3);
    assert!((node.vegetation - 1.0).abs() < 1e-5);
}

#[test]
fn test_missing_images_degrade_to_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let mut terrain = Terrain::new(&Config::default());
    terrain.load(&dir.path().join("nowhere.png")).unwrap();
    assert!(terrain.is_loaded());
    assert_eq!(terrain.heightfield().width(), 2);
    assert!(terrain.height_at(0.0, 0.0) < 0.0);
    assert!(!terrain.catalog().is_empty());

    // An all-abyss map still yields (empty) chunks.
    let chunk = terrain.get_chunk(0.0, 0.0);
    assert!(chunk.ground().is_empty());
    assert!(chunk.props().is_empty());
}

#[test]
fn test_prefetch_grows_once_and_fills_square() {
    let mut terrain = loaded(64, 90, 128);
    assert_eq!(terrain.prefetch(SIZE * 0.5, SIZE * 0.5, 2), 25);
    let b = terrain.cache_bounds().unwrap();
    assert_eq!((b.west, b.east, b.north, b.south), (-2, 2, -2, 2));
    assert_eq!(terrain.cached_chunks(), 25);
    assert_eq!(terrain.prefetch(SIZE * 0.5, SIZE * 0.5, 1), 0);
    assert_eq!(terrain.prefetch(SIZE * 0.5, SIZE * 0.5, 0), 0);
}

#[test]
fn test_render_generates_visible_chunks_only() {
    let mut terrain = loaded(160, 90, 128);
    // Middle of chunk (2, 2), looking north (-z) and slightly down.
    let camera = Camera::new(Vec3::new(2.5 * SIZE, 600.0, 2.5 * SIZE), 0.0, -0.2);
    let mut batch = DrawBatch::new();
    let stats = terrain.render(&camera, &mut batch);

    let radius = 6;
    assert_eq!(stats.visited, (2 * radius + 1) * (2 * radius + 1));
    assert!(stats.out_of_range > 0);
    assert!(stats.culled > 0);
    assert!(stats.rendered > 0);
    assert_eq!(stats.generated, terrain.cached_chunks());
    assert_eq!(stats.draw_calls, batch.len());
    assert_eq!(
        stats.visited,
        stats.out_of_range + stats.culled + stats.rendered
    );

    assert!(terrain.is_cached(2.5 * SIZE, 2.5 * SIZE));
    assert!(terrain.is_cached(2.5 * SIZE, 0.5 * SIZE));
    // Well behind the camera: never generated.
    assert!(!terrain.is_cached(2.5 * SIZE, 5.5 * SIZE));

    let mut again = DrawBatch::new();
    let second = terrain.render(&camera, &mut again);
    assert_eq!(second.generated, 0);
    assert_eq!(second.draw_calls, stats.draw_calls);
    assert_eq!(again.calls(), batch.calls());
}

#[test]
fn test_render_before_load_draws_nothing() {
    let mut terrain = Terrain::new(&Config::default());
    let mut batch = DrawBatch::new();
    let stats = terrain.render(&Camera::default(), &mut batch);
    assert_eq!(stats, Default::default());
    assert_eq!(terrain.cached_chunks(), 0);
}

#[test]
fn test_minimap_is_cached_until_reset() {
    let mut terrain = loaded(32, 150, 200);
    let first: *const image::RgbaImage = terrain.minimap(48);
    let second: *const image::RgbaImage = terrain.minimap(48);
    assert!(std::ptr::eq(first, second));
    assert_eq!(terrain.minimap(24).dimensions(), (24, 24));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minimap.png");
    terrain.save_minimap(&path, 24).unwrap();
    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (24, 24));

    terrain.reset();
    assert!(!terrain.has_minimap());
}

#[test]
fn test_height_at_matches_sampler() {
    let terrain = loaded(32, 140, 100);
    for (x, z) in [(10.0, 20.0), (512.0, 480.0), (-50.0, 2000.0)] {
        assert_eq!(terrain.height_at(x, z), terrain.at(x, z).height);
    }
}
