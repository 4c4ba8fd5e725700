use aerie_render::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("terrain materials could not be composed: {0}")]
    Render(#[from] RenderError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
