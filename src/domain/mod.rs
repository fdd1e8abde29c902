//! Domain models for nvapi-stats
//!
//! Decoded sensor values and the per-GPU report. Raw driver values are
//! validated on decode.

pub mod gpu;
pub mod thermal;
pub mod voltage;

pub use gpu::GpuStats;
pub use thermal::{Temperature, ThermalMask, ThermalReadings};
pub use voltage::Voltage;
