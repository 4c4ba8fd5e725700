//! Errors raised while locating, reading or writing `config.ron`.

use std::path::PathBuf;

/// Failure modes of the configuration layer.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The platform reports no per-user config directory and none was given.
    #[error("no config directory available on this platform")]
    NoConfigDir,

    /// `config.ron` exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// The in-memory config could not be turned back into RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),
}
