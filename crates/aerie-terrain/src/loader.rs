//! Heightmap and vegetation images to node grid.

use std::path::Path;

use aerie_lod::smooth_step;
use image::{GrayImage, Luma};
use tracing::{debug, error};

use crate::heightfield::Heightfield;
use crate::node::TerrainNode;

/// World units per unit of heightmap brightness.
pub const HEIGHT_SCALE: f32 = 1000.0;
/// Subtracted from the scaled brightness, so dark pixels are under water.
pub const SEA_LEVEL_OFFSET: f32 = 100.0;
/// Height the terrain sinks to at the map edge.
pub const ABYSS_HEIGHT: f32 = -200.0;
/// The vegetation mask repeats this many times across the heightmap.
pub const VEGETATION_TILING: u32 = 5;
/// Grey level of the fallback vegetation mask.
pub const NEUTRAL_VEGETATION: u8 = 128;

/// Read an image as 8-bit luma. Failures are logged and yield `None`.
pub fn load_gray(path: &Path) -> Option<GrayImage> {
    match image::open(path) {
        Ok(img) => {
            let gray = img.to_luma8();
            debug!(
                "Loaded {} ({}x{})",
                path.display(),
                gray.width(),
                gray.height()
            );
            Some(gray)
        }
        Err(e) => {
            error!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

/// Uniform mask used when no vegetation image is available.
pub fn neutral_vegetation() -> GrayImage {
    GrayImage::from_pixel(1, 1, Luma([NEUTRAL_VEGETATION]))
}

/// Stand-in heightmap for a missing file: a small all-abyss map.
pub fn placeholder_heightmap() -> GrayImage {
    GrayImage::from_pixel(2, 2, Luma([0]))
}

/// Width in pixels of the band along each edge that falls off to the abyss.
pub fn abyss_border(width: u32, height: u32) -> u32 {
    (width.min(height) / 16).max(1)
}

/// Build the node grid from a heightmap and vegetation mask.
///
/// Near the image edge heights ease down to [`ABYSS_HEIGHT`] so the world
/// ends in deep water rather than a cliff. The vegetation mask is sampled
/// [`VEGETATION_TILING`] times denser than the heightmap and wraps.
pub fn build_heightfield(heightmap: &GrayImage, vegetation: &GrayImage) -> Heightfield {
    let (w, h) = heightmap.dimensions();
    let (vw, vh) = vegetation.dimensions();
    let border = abyss_border(w, h) as f32;

    let mut nodes = Vec::with_capacity(w as usize * h as usize);
    for z in 0..h {
        for x in 0..w {
            let raw = heightmap.get_pixel(x, z).0[0] as f32 / 255.0 * HEIGHT_SCALE
                - SEA_LEVEL_OFFSET;

            let edge = x.min(z).min(w - 1 - x).min(h - 1 - z) as f32;
            let t = smooth_step(edge / border);
            let height = ABYSS_HEIGHT + (raw - ABYSS_HEIGHT) * t;

            let veg = if vw == 0 || vh == 0 {
                NEUTRAL_VEGETATION
            } else {
                let vx = (x * VEGETATION_TILING) % vw;
                let vz = (z * VEGETATION_TILING) % vh;
                vegetation.get_pixel(vx, vz).0[0]
            };

            nodes.push(TerrainNode::new(height, veg as f32 / 255.0));
        }
    }

    Heightfield::new(w as usize, h as usize, nodes).unwrap_or_default()
}
