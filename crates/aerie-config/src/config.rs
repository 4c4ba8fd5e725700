//! Typed settings with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// View distance, fog and detail levels.
    pub video: VideoConfig,
    /// World assets and generation seed.
    pub terrain: TerrainConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Rendering quality settings that drive terrain streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// How far terrain is drawn, in world units.
    pub view_range: f32,
    /// Exponential fog density applied to distant vegetation.
    pub fog_density: f32,
    /// Multiplier on the distance-derived LOD factor. Values above 1 keep
    /// the nearest chunks saturated at full detail.
    pub lod_gain: f32,
    /// Per-chunk generation density.
    pub detail: DetailConfig,
}

/// Generation density knobs, all counted per chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailConfig {
    /// Ground quads along one chunk edge.
    pub terrain: u32,
    /// Candidate building positions tried per chunk.
    pub props: u32,
    /// Tree quads added per vegetation LOD step.
    pub vegetation: u32,
}

/// World asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Greyscale heightmap image.
    pub heightmap: PathBuf,
    /// Vegetation mask. When unset, `<stem>_vegetation.<ext>` next to the
    /// heightmap is used.
    pub vegetation_mask: Option<PathBuf>,
    /// Ground textures in weight order: city, dry, forest, highland.
    pub textures: [PathBuf; 4],
    /// Tree billboard atlas (2x2 tiles).
    pub tree_atlas: PathBuf,
    /// Seed for prop catalog and chunk generation.
    pub seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Draw chunk boundary outlines.
    pub show_chunk_bounds: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            view_range: 6000.0,
            fog_density: 0.000_25,
            lod_gain: 1.25,
            detail: DetailConfig::default(),
        }
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            terrain: 16,
            props: 48,
            vegetation: 64,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("data/terrain/heightmap.png"),
            vegetation_mask: None,
            textures: [
                PathBuf::from("data/terrain/city.png"),
                PathBuf::from("data/terrain/dry.png"),
                PathBuf::from("data/terrain/forest.png"),
                PathBuf::from("data/terrain/highland.png"),
            ],
            tree_atlas: PathBuf::from("data/terrain/trees.png"),
            seed: 1337,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_chunk_bounds: false,
        }
    }
}

impl TerrainConfig {
    /// The vegetation mask path, explicit or derived from the heightmap name.
    pub fn vegetation_mask_path(&self) -> PathBuf {
        if let Some(path) = &self.vegetation_mask {
            return path.clone();
        }
        let stem = self
            .heightmap
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match self.heightmap.extension() {
            Some(ext) => format!("{stem}_vegetation.{}", ext.to_string_lossy()),
            None => format!("{stem}_vegetation"),
        };
        self.heightmap.with_file_name(name)
    }
}

/// Per-user config directory (`<platform config>/aerie`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("aerie"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("view_range: 6000.0"));
        assert!(ron_str.contains("seed: 1337"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(debug: (log_level: \"warn\"))").unwrap();
        assert_eq!(config.video, VideoConfig::default());
        assert_eq!(config.debug.log_level, "warn");
        assert!(!config.debug.show_chunk_bounds);
    }

    #[test]
    fn test_partial_detail_section() {
        let config: Config = ron::from_str("(video: (detail: (terrain: 8)))").unwrap();
        assert_eq!(config.video.detail.terrain, 8);
        assert_eq!(config.video.detail.props, DetailConfig::default().props);
        assert_eq!(config.video.view_range, 6000.0);
    }

    #[test]
    fn test_unknown_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(cockpit_shake: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.video.view_range = 12_000.0;
        config.terrain.seed = 7;
        config.terrain.vegetation_mask = Some(PathBuf::from("maps/veg.png"));

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.video.fog_density = 0.001;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.video.fog_density, 0.001);
    }

    #[test]
    fn test_invalid_ron_produces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_vegetation_mask_derived_from_heightmap() {
        let terrain = TerrainConfig {
            heightmap: PathBuf::from("maps/island.png"),
            ..Default::default()
        };
        assert_eq!(
            terrain.vegetation_mask_path(),
            PathBuf::from("maps/island_vegetation.png")
        );

        let explicit = TerrainConfig {
            vegetation_mask: Some(PathBuf::from("other/mask.jpg")),
            ..terrain
        };
        assert_eq!(explicit.vegetation_mask_path(), PathBuf::from("other/mask.jpg"));
    }
}
