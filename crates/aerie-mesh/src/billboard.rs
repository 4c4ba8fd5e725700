//! Billboard geometry: crossed tree quads and the shared camera-facing quad.

use glam::Vec3;

use crate::mesh::Mesh;
use crate::vertex::Vertex;

/// Texture weights stamped on tree vertices (pure "forest" channel).
const TREE_WEIGHTS: [f32; 4] = [0.0, 0.0, 1.0, 0.0];

/// A rectangular tile of a texture atlas, optionally rotated in 90° steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasRegion {
    pub min: [f32; 2],
    pub max: [f32; 2],
    /// Number of quarter turns applied to the tile (0..4).
    pub quarter_turns: u8,
}

impl AtlasRegion {
    /// The whole texture, unrotated.
    pub const FULL: Self = Self {
        min: [0.0, 0.0],
        max: [1.0, 1.0],
        quarter_turns: 0,
    };

    /// Tile `index` of a square atlas with `tiles_per_row` tiles per side.
    pub fn tile(index: u32, tiles_per_row: u32, quarter_turns: u8) -> Self {
        let per_row = tiles_per_row.max(1);
        let step = 1.0 / per_row as f32;
        let col = (index % per_row) as f32;
        let row = ((index / per_row) % per_row) as f32;
        Self {
            min: [col * step, row * step],
            max: [(col + 1.0) * step, (row + 1.0) * step],
            quarter_turns: quarter_turns % 4,
        }
    }

    /// UVs for the corners bottom-left, bottom-right, top-right, top-left.
    ///
    /// Image rows grow downward, so the bottom edge samples `max[1]`.
    pub fn corner_uvs(&self) -> [[f32; 2]; 4] {
        let base = [
            [self.min[0], self.max[1]],
            [self.max[0], self.max[1]],
            [self.max[0], self.min[1]],
            [self.min[0], self.min[1]],
        ];
        let turns = self.quarter_turns as usize % 4;
        std::array::from_fn(|i| base[(i + turns) % 4])
    }
}

/// Emit two vertical quads crossing at `base`, `width` wide and `height` tall.
pub fn push_cross_billboard(
    mesh: &mut Mesh,
    base: Vec3,
    width: f32,
    height: f32,
    region: AtlasRegion,
) {
    let uvs = region.corner_uvs();
    let half = width * 0.5;
    for axis in [Vec3::X, Vec3::Z] {
        let corners = [
            base - axis * half,
            base + axis * half,
            base + axis * half + Vec3::Y * height,
            base - axis * half + Vec3::Y * height,
        ];
        let quad: [Vertex; 4] = std::array::from_fn(|i| {
            Vertex::new(corners[i].to_array(), uvs[i]).with_weights(TREE_WEIGHTS)
        });
        mesh.push_quad(quad);
    }
}

/// A unit quad spanning x in `[-0.5, 0.5]`, y in `[0, 1]` on the z = 0 plane.
///
/// Scaled to a building's footprint and rotated to the camera yaw, it stands
/// in for distant props.
pub fn unit_billboard() -> Mesh {
    let uvs = AtlasRegion::FULL.corner_uvs();
    let corners = [
        [-0.5, 0.0, 0.0],
        [0.5, 0.0, 0.0],
        [0.5, 1.0, 0.0],
        [-0.5, 1.0, 0.0],
    ];
    let mut mesh = Mesh::with_capacity(2);
    mesh.push_quad(std::array::from_fn(|i| Vertex::new(corners[i], uvs[i])));
    mesh
}
