//! Shader sources and the linked-program cache.
//!
//! Programs are keyed by their `(vertex, fragment)` source names and linked
//! at most once. Linking here validates that each stage declares its WGSL
//! entry point; the device-side compile happens in the submission backend.

use std::collections::HashMap;

use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("shader '{name}' is not registered")]
    ShaderNotFound { name: String },

    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("material '{name}' used before compose()")]
    MaterialNotComposed { name: String },
}

/// Handle to a linked program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn entry_attribute(self) -> &'static str {
        match self {
            Stage::Vertex => "@vertex",
            Stage::Fragment => "@fragment",
        }
    }
}

#[derive(Default)]
pub struct ProgramCache {
    sources: HashMap<String, String>,
    programs: HashMap<(String, String), ProgramId>,
    next_id: u64,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named shader source.
    ///
    /// Replacing a source drops every program linked against it.
    pub fn register(&mut self, name: &str, source: &str) {
        debug!("Registering shader '{}'", name);
        if self
            .sources
            .insert(name.to_owned(), source.to_owned())
            .is_some()
        {
            self.programs.retain(|(v, f), _| v != name && f != name);
        }
    }

    /// Fetch the program for a stage pair, linking it on first use.
    pub fn get(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, RenderError> {
        let key = (vertex.to_owned(), fragment.to_owned());
        if let Some(id) = self.programs.get(&key) {
            return Ok(*id);
        }

        self.check_stage(vertex, Stage::Vertex)?;
        self.check_stage(fragment, Stage::Fragment)?;

        self.next_id += 1;
        let id = ProgramId(self.next_id);
        info!("Linked program {:?} from '{}' + '{}'", id, vertex, fragment);
        self.programs.insert(key, id);
        Ok(id)
    }

    fn check_stage(&self, name: &str, stage: Stage) -> Result<(), RenderError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| RenderError::ShaderNotFound {
                name: name.to_owned(),
            })?;
        if source.contains(stage.entry_attribute()) {
            Ok(())
        } else {
            Err(RenderError::CompilationFailed {
                name: name.to_owned(),
                message: format!("no {} entry point", stage.entry_attribute()),
            })
        }
    }

    /// Number of linked programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4(0.0); }";
    const FS: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4(1.0); }";

    fn cache() -> ProgramCache {
        let mut c = ProgramCache::new();
        c.register("ground.vs", VS);
        c.register("ground.fs", FS);
        c
    }

    #[test]
    fn test_same_pair_returns_same_program() {
        let mut c = cache();
        let a = c.get("ground.vs", "ground.fs").unwrap();
        let b = c.get("ground.vs", "ground.fs").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_missing_source_is_error() {
        let mut c = cache();
        let err = c.get("ground.vs", "missing.fs").unwrap_err();
        assert!(matches!(err, RenderError::ShaderNotFound { name } if name == "missing.fs"));
        assert!(c.is_empty());
    }

    #[test]
    fn test_wrong_stage_fails_compilation() {
        let mut c = cache();
        let err = c.get("ground.fs", "ground.fs").unwrap_err();
        assert!(matches!(err, RenderError::CompilationFailed { .. }));
    }

    #[test]
    fn test_reregister_relinks() {
        let mut c = cache();
        let first = c.get("ground.vs", "ground.fs").unwrap();
        c.register("ground.fs", FS);
        assert!(c.is_empty());
        let second = c.get("ground.vs", "ground.fs").unwrap();
        assert_ne!(first, second);
    }
}
