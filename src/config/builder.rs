//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::cli::args::OutputFormat;
use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicitly given file must load; otherwise the default locations
    /// are tried and silently skipped when absent.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.config.general.verbose = true;
        }
        self
    }

    /// Override with CLI output format
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(f) = format {
            self.config.general.format = f;
        }
        self
    }

    /// Override with CLI library path
    pub fn with_library(mut self, library: Option<String>) -> Self {
        if let Some(l) = library {
            self.config.driver.library = l;
        }
        self
    }

    /// Override with CLI GPU index
    pub fn with_gpu_index(mut self, index: Option<u32>) -> Self {
        if let Some(i) = index {
            self.config.probe.gpu = Some(i);
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(!config.general.verbose);
        assert_eq!(config.driver.library, "libnvidia-api.so.1");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_verbose(true)
            .with_format(Some(OutputFormat::Json))
            .with_library(Some("/tmp/libnvidia-api.so.1".to_string()))
            .with_gpu_index(Some(1))
            .build()
            .unwrap();

        assert!(config.general.verbose);
        assert!(matches!(config.general.format, OutputFormat::Json));
        assert_eq!(config.driver.library, "/tmp/libnvidia-api.so.1");
        assert_eq!(config.probe.gpu, Some(1));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[probe]\ngpu = 2\n\n[general]\nformat = \"compact\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .with_gpu_index(Some(0))
            .with_format(None)
            .build()
            .unwrap();

        assert_eq!(config.probe.gpu, Some(0));
        assert!(matches!(config.general.format, OutputFormat::Compact));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/nvapi-stats.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_build_validates() {
        let result = ConfigBuilder::new().with_gpu_index(Some(100)).build();
        assert!(result.is_err());
    }
}
