//! CPU-side mesh data for terrain: vertex format, triangle lists, sea-plane
//! clipping, and billboard quad emission.

pub mod billboard;
pub mod mesh;
pub mod vertex;

pub use billboard::{AtlasRegion, push_cross_billboard, unit_billboard};
pub use mesh::{Mesh, MeshId};
pub use vertex::Vertex;
