//! Configuration system for the Aerie flight simulator.
//!
//! Settings persist to disk as RON files. CLI flags parsed with clap override
//! whatever was loaded, and unknown or missing fields fall back to defaults so
//! older config files keep working.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, DetailConfig, TerrainConfig, VideoConfig, default_config_dir};
pub use error::ConfigError;
