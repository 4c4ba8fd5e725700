//! The slice of the renderer the terrain talks to.
//!
//! GPU submission itself lives elsewhere. This crate owns the camera model,
//! frustum culling, the shader program cache, materials, the texture cache,
//! and the frame-local draw batch that terrain rendering fills.

pub mod batching;
pub mod camera;
pub mod frustum;
pub mod material;
pub mod shader;
pub mod texture;

pub use batching::{DrawBatch, DrawCall, DrawGroup, InstancedDraw};
pub use camera::Camera;
pub use frustum::{Aabb, Frustum};
pub use material::{Material, MaterialId};
pub use shader::{ProgramCache, ProgramId, RenderError};
pub use texture::{Texture, TextureCache, mip_level_count};
