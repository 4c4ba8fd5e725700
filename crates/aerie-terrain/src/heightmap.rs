//! Synthetic heightmap and vegetation images from fractal Brownian motion.
//!
//! Used when no heightmap asset is available, and by tests that need a
//! believable landscape without shipping image files.

use image::{GrayImage, Luma};
use noise::{NoiseFn, Simplex};

#[derive(Clone, Debug)]
pub struct HeightmapParams {
    pub seed: u64,
    /// Edge length of the generated images in pixels.
    pub size: u32,
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per pixel.
    pub base_frequency: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            size: 256,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.0 / 96.0,
        }
    }
}

/// fBm over simplex noise, normalised to roughly `[-1, 1]`.
pub struct HeightmapSynth {
    elevation: Simplex,
    vegetation: Simplex,
    params: HeightmapParams,
}

impl HeightmapSynth {
    pub fn new(params: HeightmapParams) -> Self {
        Self {
            elevation: Simplex::new(params.seed as u32),
            vegetation: Simplex::new((params.seed as u32).wrapping_add(0x9E37)),
            params,
        }
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    fn fbm(&self, noise: &Simplex, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.params.octaves {
            total += noise.get([x * frequency, y * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        total / self.max_amplitude()
    }

    /// Geometric sum of octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum.max(f64::EPSILON)
    }

    /// Elevation at pixel `(x, y)` in `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.fbm(&self.elevation, x, y)
    }

    pub fn heightmap_image(&self) -> GrayImage {
        let size = self.params.size;
        GrayImage::from_fn(size, size, |x, y| {
            Luma([to_luma(self.sample(x as f64, y as f64) * 0.5 + 0.5)])
        })
    }

    /// Vegetation mask, thinner on high ground.
    pub fn vegetation_image(&self) -> GrayImage {
        let size = self.params.size;
        GrayImage::from_fn(size, size, |x, y| {
            let (fx, fy) = (x as f64 * 3.0, y as f64 * 3.0);
            let density = self.fbm(&self.vegetation, fx, fy) * 0.5 + 0.5;
            let elevation = self.sample(x as f64, y as f64) * 0.5 + 0.5;
            Luma([to_luma(density * (1.2 - elevation))])
        })
    }
}

fn to_luma(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> HeightmapSynth {
        HeightmapSynth::new(HeightmapParams {
            seed,
            size: 32,
            ..Default::default()
        })
    }

    #[test]
    fn test_same_seed_same_image() {
        assert_eq!(small(7).heightmap_image(), small(7).heightmap_image());
        assert_eq!(small(7).vegetation_image(), small(7).vegetation_image());
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(small(1).heightmap_image(), small(2).heightmap_image());
    }

    #[test]
    fn test_samples_normalised() {
        let synth = small(3);
        for y in 0..32 {
            for x in 0..32 {
                let v = synth.sample(x as f64 * 3.7, y as f64 * 1.3);
                assert!((-1.01..=1.01).contains(&v), "sample {v} out of range");
            }
        }
    }

    #[test]
    fn test_image_dimensions() {
        let synth = small(4);
        assert_eq!(synth.heightmap_image().dimensions(), (32, 32));
        assert_eq!(synth.vegetation_image().dimensions(), (32, 32));
    }

    #[test]
    fn test_heightmap_has_relief() {
        let img = small(5).heightmap_image();
        let lo = img.pixels().map(|p| p.0[0]).min().unwrap();
        let hi = img.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(hi - lo > 10);
    }
}
