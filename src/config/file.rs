//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// The first default file that loads wins; unreadable or invalid
    /// files are skipped.
    pub fn load_default() -> Option<Config> {
        Self::default_paths()
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load(&path).ok())
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("nvapi-stats").join("config.toml"));
        }

        // Current directory
        paths.push(PathBuf::from("nvapi-stats.toml"));

        paths
    }
}
