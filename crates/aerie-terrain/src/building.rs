//! Procedural building meshes consumed by the prop catalog.
//!
//! The catalog only depends on the [`BuildingGenerator`] trait; [`BoxMassing`]
//! is the stock producer that stacks boxes for the main hall and its wings
//! and caps them with a roof.

use aerie_mesh::{AtlasRegion, Mesh, Vertex};
use glam::{Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Depth of the foundation every building extends below its base, so it
/// meets sloped ground without gaps.
pub const BUILDING_STEM: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoofKind {
    Flat,
    Pyramid,
    Gable,
}

impl RoofKind {
    pub fn random(rng: &mut ChaCha8Rng) -> Self {
        match rng.random_range(0..3) {
            0 => Self::Flat,
            1 => Self::Pyramid,
            _ => Self::Gable,
        }
    }
}

/// Inputs to a building generator.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingParams {
    /// Width, wall height and depth of the main hall.
    pub size: Vec3,
    pub wings: u32,
    pub roof: RoofKind,
    /// Facade style, `'a'..='d'`.
    pub style: char,
    /// Roof inset from the wall line, in world units.
    pub corner_rounding: f32,
}

/// A generated building.
#[derive(Clone, Debug)]
pub struct Model {
    pub mesh: Mesh,
    /// Width and depth of the main hall.
    pub footprint: Vec2,
    /// Height of the highest point above the base.
    pub height: f32,
    pub wings: u32,
    pub roof: RoofKind,
    pub style: char,
    /// Seed the model was generated from, shared by all its detail tiers.
    pub seed: u64,
}

pub trait BuildingGenerator {
    fn generate(&self, rng: &mut ChaCha8Rng, params: &BuildingParams) -> Model;
}

/// Boxes for hall and wings, one of three roof shapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxMassing;

impl BuildingGenerator for BoxMassing {
    fn generate(&self, rng: &mut ChaCha8Rng, params: &BuildingParams) -> Model {
        let style_index = (params.style as u32).wrapping_sub('a' as u32) % 4;
        let facade = AtlasRegion::tile(style_index, 2, 0);
        let mut mesh = Mesh::new();

        let half = Vec3::new(params.size.x * 0.5, 0.0, params.size.z * 0.5);
        let top = params.size.y;
        push_box(
            &mut mesh,
            Vec3::new(-half.x, -BUILDING_STEM, -half.z),
            Vec3::new(half.x, top, half.z),
            facade,
        );

        let sides = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];
        for i in 0..params.wings {
            let dir = sides[i as usize % 4];
            let along = Vec3::new(dir.x.abs(), 0.0, dir.z.abs());
            let across = Vec3::ONE - along - Vec3::Y;
            let reach = rng.random_range(0.3..0.6);
            let wing_height = top * rng.random_range(0.5..0.8);
            // Centre the wing just outside the hall wall it extends from.
            let wall = dir * (half * along).length();
            let depth = (params.size * along).length() * reach;
            let breadth = (params.size * across).length() * 0.5;
            let center = wall + dir * depth * 0.5;
            let extent = along * depth * 0.5 + across * breadth * 0.5;
            push_box(
                &mut mesh,
                center - extent - Vec3::Y * BUILDING_STEM,
                center + extent + Vec3::Y * wing_height,
                facade,
            );
        }

        let inset = params
            .corner_rounding
            .clamp(0.0, half.x.min(half.z) * 0.5);
        let rx = half.x - inset;
        let rz = half.z - inset;
        let rise = params.size.x.min(params.size.z) * 0.4;
        let height = match params.roof {
            RoofKind::Flat => {
                push_flat(&mut mesh, rx, rz, top);
                top
            }
            RoofKind::Pyramid => {
                push_pyramid(&mut mesh, rx, rz, top, rise);
                top + rise
            }
            RoofKind::Gable => {
                push_gable(&mut mesh, rx, rz, top, rise);
                top + rise
            }
        };

        mesh.compose();
        Model {
            mesh,
            footprint: Vec2::new(params.size.x, params.size.z),
            height,
            wings: params.wings,
            roof: params.roof,
            style: params.style,
            seed: 0,
        }
    }
}

fn push_triangle(mesh: &mut Mesh, a: Vec3, b: Vec3, c: Vec3) {
    let n = (b - a).cross(c - a).normalize_or(Vec3::Y).to_array();
    let v = |p: Vec3, uv: [f32; 2]| Vertex {
        normal: n,
        ..Vertex::new(p.to_array(), uv)
    };
    mesh.push_triangle(v(a, [0.0, 1.0]), v(b, [1.0, 1.0]), v(c, [0.5, 0.0]));
}

/// Four walls and a top, no bottom.
fn push_box(mesh: &mut Mesh, min: Vec3, max: Vec3, facade: AtlasRegion) {
    let uvs = facade.corner_uvs();
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5;
    let height = max.y - min.y;

    for n in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
        // c1 - c0 runs along n x Y, which makes the quad normal equal n.
        let edge = n.cross(Vec3::Y);
        let half_width = (half * edge.abs()).length();
        let base = Vec3::new(center.x, min.y, center.z) + n * (half * n.abs()).length();
        let c0 = base - edge * half_width;
        let c1 = base + edge * half_width;
        let corners = [c0, c1, c1 + Vec3::Y * height, c0 + Vec3::Y * height];
        mesh.push_quad(std::array::from_fn(|i| {
            Vertex::new(corners[i].to_array(), uvs[i])
        }));
    }
    push_flat_at(mesh, min.x, max.x, min.z, max.z, max.y);
}

fn push_flat_at(mesh: &mut Mesh, x0: f32, x1: f32, z0: f32, z1: f32, y: f32) {
    let corners = [[x0, y, z0], [x1, y, z0], [x1, y, z1], [x0, y, z1]];
    let uvs = AtlasRegion::FULL.corner_uvs();
    mesh.push_quad(std::array::from_fn(|i| Vertex::new(corners[i], uvs[i])));
}

fn push_flat(mesh: &mut Mesh, rx: f32, rz: f32, top: f32) {
    push_flat_at(mesh, -rx, rx, -rz, rz, top + 0.05);
}

fn push_pyramid(mesh: &mut Mesh, rx: f32, rz: f32, top: f32, rise: f32) {
    let apex = Vec3::new(0.0, top + rise, 0.0);
    // Walk the eaves so each face winds outward.
    let ring = [
        Vec3::new(-rx, top, rz),
        Vec3::new(rx, top, rz),
        Vec3::new(rx, top, -rz),
        Vec3::new(-rx, top, -rz),
    ];
    for i in 0..4 {
        push_triangle(mesh, ring[i], ring[(i + 1) % 4], apex);
    }
}

fn push_gable(mesh: &mut Mesh, rx: f32, rz: f32, top: f32, rise: f32) {
    let ridge = top + rise;
    let uvs = AtlasRegion::FULL.corner_uvs();
    let slopes = [
        [
            [rx, top, rz],
            [-rx, top, rz],
            [-rx, ridge, 0.0],
            [rx, ridge, 0.0],
        ],
        [
            [-rx, top, -rz],
            [rx, top, -rz],
            [rx, ridge, 0.0],
            [-rx, ridge, 0.0],
        ],
    ];
    for corners in slopes {
        mesh.push_quad(std::array::from_fn(|i| Vertex::new(corners[i], uvs[i])));
    }
    push_triangle(
        mesh,
        Vec3::new(rx, top, rz),
        Vec3::new(rx, top, -rz),
        Vec3::new(rx, ridge, 0.0),
    );
    push_triangle(
        mesh,
        Vec3::new(-rx, top, -rz),
        Vec3::new(-rx, top, rz),
        Vec3::new(-rx, ridge, 0.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params(roof: RoofKind, wings: u32) -> BuildingParams {
        BuildingParams {
            size: Vec3::new(12.0, 8.0, 10.0),
            wings,
            roof,
            style: 'b',
            corner_rounding: 0.5,
        }
    }

    fn build(p: &BuildingParams) -> Model {
        BoxMassing.generate(&mut ChaCha8Rng::seed_from_u64(1), p)
    }

    #[test]
    fn test_hall_bounds_include_stem() {
        let m = build(&params(RoofKind::Flat, 0));
        let (lo, hi) = m.mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-6.0, -BUILDING_STEM, -5.0));
        assert!((hi.y - 8.05).abs() < 1e-5);
        assert_eq!(m.footprint, Vec2::new(12.0, 10.0));
        assert_eq!(m.height, 8.0);
        assert!(m.mesh.is_composed());
    }

    #[test]
    fn test_roofs_raise_height() {
        let flat = build(&params(RoofKind::Flat, 0));
        let pyramid = build(&params(RoofKind::Pyramid, 0));
        let gable = build(&params(RoofKind::Gable, 0));
        assert!(pyramid.height > flat.height);
        assert_eq!(pyramid.height, gable.height);
        let (_, hi) = pyramid.mesh.bounds().unwrap();
        assert!((hi.y - pyramid.height).abs() < 1e-4);
    }

    #[test]
    fn test_wings_extend_beyond_hall() {
        let plain = build(&params(RoofKind::Flat, 0));
        let winged = build(&params(RoofKind::Flat, 2));
        let (plo, phi) = plain.mesh.bounds().unwrap();
        let (wlo, whi) = winged.mesh.bounds().unwrap();
        assert!(whi.x > phi.x);
        assert!(wlo.x < plo.x);
        assert!(winged.mesh.triangle_count() > plain.mesh.triangle_count());
    }

    #[test]
    fn test_walls_face_outward() {
        let m = build(&params(RoofKind::Pyramid, 0));
        let center = Vec3::new(0.0, 4.0, 0.0);
        for tri in m.mesh.triangles() {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| v.position_vec());
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            let out = centroid - center;
            assert!(
                face.dot(Vec3::new(out.x, out.y.max(0.0), out.z)) >= -1e-3,
                "inward face at {centroid:?}"
            );
        }
    }
}
