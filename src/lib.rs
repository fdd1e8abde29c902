//! nvapi-stats - NVIDIA GPU sensor reader
//!
//! Reads core voltage, hotspot temperature and memory temperature through
//! undocumented NVAPI entry points exported by `libnvidia-api.so.1`.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Sensor value types
//! - [`error`]: Error types
//! - [`nvapi`]: NVAPI loading, records and lifecycle
//! - [`services`]: Mask probing and sensor reads

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod nvapi;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
