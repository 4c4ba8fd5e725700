//! Non-indexed triangle meshes with GPU-upload bookkeeping.
//!
//! Terrain quads deliberately do not share vertices: every quad carries its
//! own flat normal and texture weights, so a plain triangle list is the
//! natural container and keeps clipping a per-triangle operation.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::vertex::Vertex;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned to a mesh when it is composed (uploaded).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// A triangle list: every three consecutive vertices form one triangle.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    id: Option<MeshId>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
            id: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }

    /// Append one triangle. Invalidates any previous upload.
    pub fn push_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        self.vertices.extend_from_slice(&[a, b, c]);
        self.id = None;
    }

    /// Append a quad as two triangles with one flat normal.
    ///
    /// Corners are given in order `c0, c1, c2, c3` around the quad; the
    /// normal is `(c3 - c0) x (c1 - c0)`, which points up for a ground quad
    /// laid out `(x, z), (x + s, z), (x + s, z + s), (x, z + s)`.
    pub fn push_quad(&mut self, corners: [Vertex; 4]) {
        let [c0, c1, _, c3] = corners.map(|c| c.position_vec());
        let normal = (c3 - c0).cross(c1 - c0).try_normalize().unwrap_or(Vec3::Y);

        let mut quad = corners;
        for v in &mut quad {
            v.normal = normal.to_array();
        }
        self.push_triangle(quad[0], quad[3], quad[2]);
        self.push_triangle(quad[0], quad[2], quad[1]);
    }

    /// Discard geometry below the horizontal plane `y = plane_y`.
    ///
    /// Triangles entirely above are kept, those entirely below are dropped,
    /// and straddling triangles are split at the plane with every attribute
    /// interpolated. Winding order is preserved.
    pub fn clip_below(&mut self, plane_y: f32) {
        let source = std::mem::take(&mut self.vertices);
        let mut out = Vec::with_capacity(source.len());
        for tri in source.chunks_exact(3) {
            clip_triangle([tri[0], tri[1], tri[2]], plane_y, &mut out);
        }
        self.vertices = out;
        self.id = None;
    }

    /// Mark the mesh as uploaded and hand out its draw id.
    ///
    /// Composing an already-composed, unmodified mesh returns the same id.
    pub fn compose(&mut self) -> MeshId {
        *self
            .id
            .get_or_insert_with(|| MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed)))
    }

    /// The draw id, if the mesh has been composed since its last change.
    pub fn id(&self) -> Option<MeshId> {
        self.id
    }

    pub fn is_composed(&self) -> bool {
        self.id.is_some()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(Vertex::position_vec);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Bytes this mesh occupies in a vertex buffer.
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }

    /// Vertex data ready for a buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

fn clip_triangle(tri: [Vertex; 3], plane_y: f32, out: &mut Vec<Vertex>) {
    let above = tri.map(|v| v.position[1] >= plane_y);
    let count = above.iter().filter(|&&a| a).count();

    let cut = |a: &Vertex, b: &Vertex| {
        let da = a.position[1] - plane_y;
        let db = b.position[1] - plane_y;
        let mut v = a.lerp(b, da / (da - db));
        v.position[1] = plane_y;
        v
    };

    match count {
        3 => out.extend_from_slice(&tri),
        0 => {}
        1 => {
            // Rotate so the lone vertex above the plane comes first.
            let r = above.iter().position(|&a| a).unwrap_or(0);
            let (a, b, c) = (tri[r], tri[(r + 1) % 3], tri[(r + 2) % 3]);
            out.extend_from_slice(&[a, cut(&a, &b), cut(&a, &c)]);
        }
        _ => {
            // Rotate so the lone vertex below the plane comes last.
            let r = above.iter().position(|&a| !a).unwrap_or(2);
            let (a, b, c) = (tri[(r + 1) % 3], tri[(r + 2) % 3], tri[r]);
            let bc = cut(&b, &c);
            let ca = cut(&a, &c);
            out.extend_from_slice(&[a, b, bc, a, bc, ca]);
        }
    }
}
