//! Landscape configuration. Loaded from `landscape.ron` at startup.

use procgen::GenerationParameters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Run settings: where to write, and what to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandscapeConfig {
    /// Directory the heightmap PNG is written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File stem; an incrementing `_<n>` suffix is appended.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    #[serde(default)]
    pub terrain: GenerationParameters,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_file_stem() -> String {
    "T_HeightMap".to_string()
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_stem: default_file_stem(),
            terrain: GenerationParameters::default(),
        }
    }
}

impl LandscapeConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) => log::warn!("No config at {:?}: {}, using defaults", path, e),
        }
        Self::default()
    }

    /// Save current config to `path`. Logs on error.
    pub fn save(&self, path: &Path) {
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("landscape.ron")
}
