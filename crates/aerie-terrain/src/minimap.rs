//! Top-down colour overview of the heightfield.

use image::{Rgba, RgbaImage};

use crate::heightfield::Heightfield;
use crate::node::TerrainNode;

const SHALLOW_WATER: [f32; 3] = [40.0, 96.0, 160.0];
const DEEP_WATER: [f32; 3] = [12.0, 36.0, 84.0];
/// Depth at which water reaches its darkest colour.
const WATER_DEPTH: f32 = 200.0;

/// Land colours in texture weight order.
const PALETTE: [[f32; 3]; 4] = [
    [150.0, 146.0, 140.0],
    [190.0, 170.0, 120.0],
    [62.0, 118.0, 52.0],
    [205.0, 205.0, 195.0],
];

/// Render a `size` by `size` overview covering the whole heightfield.
pub fn render_minimap(heightfield: &Heightfield, size: u32) -> RgbaImage {
    let size = size.max(1);
    let extent_x = heightfield.width() as f32 * TerrainNode::SIZE;
    let extent_z = heightfield.height() as f32 * TerrainNode::SIZE;
    RgbaImage::from_fn(size, size, |px, pz| {
        let x = (px as f32 + 0.5) / size as f32 * extent_x;
        let z = (pz as f32 + 0.5) / size as f32 * extent_z;
        node_color(&heightfield.at(x, z))
    })
}

fn node_color(node: &TerrainNode) -> Rgba<u8> {
    let rgb = if node.height <= 0.0 {
        let t = (-node.height / WATER_DEPTH).clamp(0.0, 1.0);
        std::array::from_fn(|i| SHALLOW_WATER[i] + (DEEP_WATER[i] - SHALLOW_WATER[i]) * t)
    } else {
        let shade = 0.75 + 0.25 * (node.height / 1000.0).clamp(0.0, 1.0);
        let mut rgb = [0.0f32; 3];
        for (weight, color) in node.texture.iter().zip(PALETTE) {
            for (c, p) in rgb.iter_mut().zip(color) {
                *c += weight * p * shade;
            }
        }
        rgb
    };
    Rgba([
        rgb[0].clamp(0.0, 255.0) as u8,
        rgb[1].clamp(0.0, 255.0) as u8,
        rgb[2].clamp(0.0, 255.0) as u8,
        255,
    ])
}
