//! Materials: a program plus a fixed set of texture slots.

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::shader::{ProgramCache, ProgramId, RenderError};
use crate::texture::Texture;

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

/// Textures bound to numbered slots and the program that samples them.
///
/// A material is unusable until [`Material::compose`] links its program.
#[derive(Clone, Debug)]
pub struct Material {
    id: MaterialId,
    name: String,
    textures: Vec<Option<Texture>>,
    program: Option<ProgramId>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MaterialId(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            textures: Vec::new(),
            program: None,
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_texture(&mut self, slot: usize, texture: Texture) {
        if self.textures.len() <= slot {
            self.textures.resize(slot + 1, None);
        }
        self.textures[slot] = Some(texture);
    }

    pub fn texture(&self, slot: usize) -> Option<&Texture> {
        self.textures.get(slot).and_then(Option::as_ref)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    /// Link the program for this material. Idempotent.
    pub fn compose(
        &mut self,
        programs: &mut ProgramCache,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramId, RenderError> {
        if let Some(id) = self.program {
            return Ok(id);
        }
        let id = programs.get(vertex, fragment)?;
        debug!("Composed material '{}' with {:?}", self.name, id);
        self.program = Some(id);
        Ok(id)
    }

    pub fn is_composed(&self) -> bool {
        self.program.is_some()
    }

    /// The linked program, or an error if `compose` has not run.
    pub fn program(&self) -> Result<ProgramId, RenderError> {
        self.program.ok_or_else(|| RenderError::MaterialNotComposed {
            name: self.name.clone(),
        })
    }
}
