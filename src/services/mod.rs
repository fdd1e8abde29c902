//! Service layer for sensor probing
//!
//! Services encapsulate the probing protocol: thermal mask discovery and
//! per-GPU voltage/thermal reads.

pub mod sensor_probe;
pub mod thermal_mask;

pub use sensor_probe::SensorProbe;
pub use thermal_mask::{probe_thermal_mask, MaskProbe};
