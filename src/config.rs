use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::artists::CustomArtistConfig;

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the file itself is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of parallel workers for batch analysis. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// Largest accepted upload, in megabytes.
    pub max_upload_mb: u64,
    /// Custom artist definitions (merged with the built-in table).
    #[serde(rename = "artists")]
    pub custom_artists: Vec<CustomArtistConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            max_upload_mb: crate::DEFAULT_MAX_UPLOAD_MB,
            custom_artists: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`, or from `~/.config/arisyn/config.toml` when no
    /// path is given. Returns default config if the file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed, or if an
    /// explicitly given path is missing.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(missing) = path.filter(|p| !p.exists()) {
            log::warn!("No config at {}, using defaults", missing.display());
            return Self::default();
        }

        let config_path = path.map(Path::to_path_buf).or_else(Self::config_path);
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
