//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging. Every setting
//! has a default, so running without a config file is the normal case.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::cli::args::OutputFormat;
use crate::error::ConfigError;
use crate::nvapi::{NVAPI_LIBRARY, NVAPI_MAX_PHYSICAL_GPUS};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Driver library settings
    pub driver: DriverConfig,
    /// Probe settings
    pub probe: ProbeConfig,
}

impl Config {
    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.library.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "driver.library".to_string(),
                message: "library name must not be empty".to_string(),
            });
        }

        if let Some(gpu) = self.probe.gpu {
            if gpu as usize >= NVAPI_MAX_PHYSICAL_GPUS {
                return Err(ConfigError::InvalidValue {
                    key: "probe.gpu".to_string(),
                    message: format!("must be below {}", NVAPI_MAX_PHYSICAL_GPUS),
                });
            }
        }

        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Output format
    pub format: OutputFormat,
}

/// Driver library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// NVAPI shared library name or path
    pub library: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            library: NVAPI_LIBRARY.to_string(),
        }
    }
}

/// Probe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Only report the GPU at this enumeration index
    pub gpu: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert!(matches!(config.general.format, OutputFormat::Table));
        assert_eq!(config.driver.library, "libnvidia-api.so.1");
        assert_eq!(config.probe.gpu, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[probe]\ngpu = 1\n").unwrap();
        assert_eq!(config.probe.gpu, Some(1));
        assert_eq!(config.driver.library, NVAPI_LIBRARY);
    }

    #[test]
    fn test_format_from_toml() {
        let config: Config = toml::from_str("[general]\nformat = \"json\"\n").unwrap();
        assert!(matches!(config.general.format, OutputFormat::Json));
    }

    #[test]
    fn test_validate_rejects_empty_library() {
        let mut config = Config::default();
        config.driver.library = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_gpu_out_of_bounds() {
        let mut config = Config::default();
        config.probe.gpu = Some(64);
        assert!(config.validate().is_err());
    }
}
