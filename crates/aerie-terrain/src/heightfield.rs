//! Dense node grid with continuous point queries.

use crate::node::TerrainNode;

/// Row-major grid of nodes spaced [`TerrainNode::SIZE`] apart.
#[derive(Clone, Debug, Default)]
pub struct Heightfield {
    width: usize,
    height: usize,
    nodes: Vec<TerrainNode>,
}

impl Heightfield {
    /// Wrap `nodes`, which must hold `width * height` entries.
    pub fn new(width: usize, height: usize, nodes: Vec<TerrainNode>) -> Option<Self> {
        (nodes.len() == width * height).then_some(Self {
            width,
            height,
            nodes,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TerrainNode] {
        &self.nodes
    }

    /// The grid node at `(ix, iz)`, clamped into the grid.
    pub fn node(&self, ix: usize, iz: usize) -> TerrainNode {
        if self.nodes.is_empty() {
            return TerrainNode::default();
        }
        let ix = ix.min(self.width - 1);
        let iz = iz.min(self.height - 1);
        self.nodes[ix + iz * self.width]
    }

    /// Interpolated sample at world position `(x, z)`.
    ///
    /// The cell is clamped so that a 2x2 neighbourhood always exists and the
    /// fraction within it to `[0, 1]`, so points outside the grid take the
    /// border value. Height uses cosine interpolation, every other field
    /// plain bilinear.
    pub fn at(&self, x: f32, z: f32) -> TerrainNode {
        if self.nodes.is_empty() {
            return TerrainNode::default();
        }

        let (ix, fx) = cell(x / TerrainNode::SIZE, self.width);
        let (iz, fz) = cell(z / TerrainNode::SIZE, self.height);

        let n00 = self.node(ix, iz);
        let n10 = self.node(ix + 1, iz);
        let n01 = self.node(ix, iz + 1);
        let n11 = self.node(ix + 1, iz + 1);

        let height = cosine(
            cosine(n00.height, n10.height, fx),
            cosine(n01.height, n11.height, fx),
            fz,
        );
        let bilinear = |f: fn(&TerrainNode) -> f32| {
            lerp(lerp(f(&n00), f(&n10), fx), lerp(f(&n01), f(&n11), fx), fz)
        };

        TerrainNode {
            height,
            vegetation: bilinear(|n| n.vegetation),
            texture: [
                bilinear(|n| n.texture[0]),
                bilinear(|n| n.texture[1]),
                bilinear(|n| n.texture[2]),
                bilinear(|n| n.texture[3]),
            ],
        }
    }

    /// Lowest and highest node heights, `None` when empty.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.nodes.iter().map(|n| n.height);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }
}

/// Cell index and fraction within it along one axis.
fn cell(g: f32, extent: usize) -> (usize, f32) {
    if g.is_nan() {
        return (0, 0.0);
    }
    let i = g.floor().clamp(0.0, extent.saturating_sub(2) as f32);
    let f = (g - i).clamp(0.0, 1.0);
    (i as usize, if f.is_nan() { 0.0 } else { f })
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cosine interpolation. Stays within `[a, b]` for `t` in `[0, 1]`.
fn cosine(a: f32, b: f32, t: f32) -> f32 {
    let t = (1.0 - (t * std::f32::consts::PI).cos()) * 0.5;
    lerp(a, b, t)
}
