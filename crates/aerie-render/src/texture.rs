//! Texture loading with a flat placeholder on failure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use log::{debug, error};

/// Grey used for textures that failed to load.
pub const PLACEHOLDER_RGBA: [u8; 4] = [128, 128, 128, 255];

const PLACEHOLDER_SIZE: u32 = 4;

/// Calculates the number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    (width.max(height).max(1) as f32).log2().floor() as u32 + 1
}

/// Decoded RGBA pixels, shared cheaply between materials.
#[derive(Clone, Debug)]
pub struct Texture {
    name: String,
    pixels: Arc<RgbaImage>,
    placeholder: bool,
}

impl Texture {
    pub fn from_image(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            name: name.into(),
            pixels: Arc::new(pixels),
            placeholder: false,
        }
    }

    pub fn solid(name: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_image(name, RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::solid(name, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_RGBA)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn mip_levels(&self) -> u32 {
        let (w, h) = self.dimensions();
        mip_level_count(w, h)
    }

    /// Whether this texture stands in for one that failed to load.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Loads each path once. Failed loads are cached as placeholders too, so a
/// missing file is reported a single time.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Texture>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Texture {
        if let Some(tex) = self.textures.get(path) {
            return tex.clone();
        }

        let name = path.display().to_string();
        let tex = match image::open(path) {
            Ok(img) => {
                debug!("Loaded texture '{}'", name);
                Texture::from_image(name, img.to_rgba8())
            }
            Err(e) => {
                error!("Failed to load texture '{}': {}", name, e);
                Texture::placeholder(name)
            }
        };
        self.textures.insert(path.to_path_buf(), tex.clone());
        tex
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}
