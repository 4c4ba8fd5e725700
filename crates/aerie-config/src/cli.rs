//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Aerie command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "aerie", about = "Aerie terrain flyover")]
pub struct CliArgs {
    /// Heightmap image to load.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// View range in world units.
    #[arg(long)]
    pub view_range: Option<f32>,

    /// Ground subdivisions per chunk edge.
    #[arg(long)]
    pub detail: Option<u32>,

    /// World generation seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames to fly.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Write the terrain minimap to this PNG when done.
    #[arg(long)]
    pub minimap: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.heightmap {
            self.terrain.heightmap = path.clone();
        }
        if let Some(range) = args.view_range {
            self.video.view_range = range;
        }
        if let Some(detail) = args.detail {
            self.video.detail.terrain = detail;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
