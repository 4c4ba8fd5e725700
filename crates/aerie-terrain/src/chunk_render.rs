//! Turning a chunk into draw calls for one LOD factor.

use aerie_lod::{
    PropDetail, batch_offset, fog_blend, ground_scale, prop_detail, vegetation_batches,
    vegetation_level,
};
use aerie_mesh::MeshId;
use aerie_render::{Camera, DrawBatch, DrawCall, MaterialId, ProgramId};
use glam::{Mat4, Vec3};

use crate::chunk::{TREE_SINK, TerrainChunk};
use crate::props::PropCatalog;

/// Linked programs, one per kind of chunk geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPrograms {
    pub ground: ProgramId,
    pub trees: ProgramId,
    pub props: ProgramId,
    pub billboard: ProgramId,
}

/// Materials shared by every chunk. The ground material is per chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMaterials {
    pub trees: MaterialId,
    pub props: MaterialId,
    pub billboard: MaterialId,
}

pub struct RenderContext<'a> {
    pub batch: &'a mut DrawBatch,
    pub camera: &'a Camera,
    pub catalog: &'a PropCatalog,
    pub programs: ChunkPrograms,
    pub materials: ChunkMaterials,
    /// Unit quad standing in for distant buildings.
    pub billboard: MeshId,
    pub fog_density: f32,
}

impl TerrainChunk {
    /// Queue this chunk at `distance` world units and LOD factor `lod`.
    /// Returns the number of draw calls pushed.
    pub fn render(&self, ctx: &mut RenderContext<'_>, distance: f32, lod: f32) -> usize {
        let before = ctx.batch.len();
        let fog = fog_blend(ctx.fog_density, distance);
        let origin = Mat4::from_translation(self.origin());
        // Far chunks are squashed towards sea level; content follows the ground.
        let scale = ground_scale(lod);
        let flatten = origin * Mat4::from_scale(Vec3::new(1.0, scale, 1.0));

        if let Some(mesh) = self.ground().id()
            && !self.ground().is_empty()
        {
            ctx.batch.push(DrawCall {
                program: ctx.programs.ground,
                material: self.material(),
                mesh,
                transform: flatten,
                fog,
            });
        }

        let level = vegetation_level(lod);
        for (batch, forest) in self.forest().iter().enumerate().take(vegetation_batches(level)) {
            let Some(mesh) = forest.id() else { continue };
            if forest.is_empty() {
                continue;
            }
            let sink = batch_offset(level, batch, TREE_SINK);
            ctx.batch.push(DrawCall {
                program: ctx.programs.trees,
                material: ctx.materials.trees,
                mesh,
                transform: flatten * Mat4::from_translation(Vec3::Y * sink),
                fog,
            });
        }

        match prop_detail(lod) {
            PropDetail::Model(tier) => {
                for prop in self.props() {
                    let Some(model) = ctx.catalog.resolve(prop.models[tier]) else {
                        continue;
                    };
                    let Some(mesh) = model.mesh.id() else { continue };
                    ctx.batch.push(DrawCall {
                        program: ctx.programs.props,
                        material: ctx.materials.props,
                        mesh,
                        transform: origin * settle(prop.anchor.y, scale) * prop.transform,
                        fog,
                    });
                }
            }
            PropDetail::Billboard => {
                let rotation = ctx.camera.billboard_rotation();
                for prop in self.props() {
                    ctx.batch.push(DrawCall {
                        program: ctx.programs.billboard,
                        material: ctx.materials.billboard,
                        mesh: ctx.billboard,
                        transform: origin
                            * settle(prop.anchor.y, scale)
                            * prop.billboard_transform(rotation),
                        fog,
                    });
                }
            }
        }

        ctx.batch.len() - before
    }
}

/// Lowers something standing at height `base` onto ground scaled by `scale`
/// without squashing it.
fn settle(base: f32, scale: f32) -> Mat4 {
    Mat4::from_translation(Vec3::Y * base * (scale - 1.0))
}
