//! Unified error types for nvapi-stats
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use crate::nvapi::{NvStatus, QueryId};
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from NVAPI operations
    #[error("NVAPI error: {0}")]
    Nvapi(#[from] NvapiError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Requested GPU index is not among the enumerated devices
    #[error("GPU not found at index {index} ({count} GPU(s) detected)")]
    GpuNotFound { index: u32, count: usize },

    /// IO error (console output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the NVAPI probe
///
/// Load, initialization and enumeration failures end the run.
/// `ThermalProbeDegraded` is a warning. `ResolutionFailed` is fatal only for
/// the entry points a load requires; the rest only affect a single device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NvapiError {
    /// The vendor library (or its query entry point) could not be loaded
    #[error("Could not load {library}: {reason}")]
    DriverNotFound { library: String, reason: String },

    /// `nvapi_QueryInterface` returned no entry point for this ID
    #[error("Could not get function for {0}")]
    ResolutionFailed(QueryId),

    /// NvAPI_Initialize returned a non-zero status
    #[error("NvAPI_Initialize failed with status {0}")]
    InitializationFailed(NvStatus),

    /// EnumPhysicalGPUs returned a non-zero status
    #[error("EnumPhysicalGPUs failed with status {0}")]
    EnumerationFailed(NvStatus),

    /// Even the bit-0 thermal probe was rejected; mask degraded to 0x1
    #[error("Initial thermals query failed with status {0}, assuming mask 0x00000001")]
    ThermalProbeDegraded(NvStatus),

    /// GetVoltage returned a non-zero status
    #[error("GetVoltage failed with status {0}")]
    VoltageUnavailable(NvStatus),

    /// GetThermals returned a non-zero status
    #[error("GetThermals failed with status {0}")]
    ThermalsUnavailable(NvStatus),
}

impl NvapiError {
    /// Raw driver status carried by the error, if any
    pub fn status(&self) -> Option<NvStatus> {
        match self {
            NvapiError::InitializationFailed(s)
            | NvapiError::EnumerationFailed(s)
            | NvapiError::ThermalProbeDegraded(s)
            | NvapiError::VoltageUnavailable(s)
            | NvapiError::ThermalsUnavailable(s) => Some(*s),
            NvapiError::DriverNotFound { .. } | NvapiError::ResolutionFailed(_) => None,
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
