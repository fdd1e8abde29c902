//! Per-GPU sensor report
//!
//! Provides the GpuStats struct collecting everything read from one device.

use crate::domain::{ThermalMask, ThermalReadings, Voltage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor readings for one physical GPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuStats {
    /// Enumeration index (0-based, driver order)
    pub index: u32,
    /// PCI bus number, if the driver reports it
    pub bus_id: Option<u32>,
    /// Probed thermal sensor mask
    pub thermal_mask: ThermalMask,
    /// The mask fell back to bit 0 because the first probe failed
    pub mask_degraded: bool,
    /// Core voltage; `None` when the driver call failed
    pub voltage: Option<Voltage>,
    /// Decoded temperatures; `None` when the driver call failed
    pub thermals: Option<ThermalReadings>,
}

impl GpuStats {
    /// Create an empty report for the GPU at `index`
    pub fn new(index: u32, thermal_mask: ThermalMask) -> Self {
        Self {
            index,
            bus_id: None,
            thermal_mask,
            mask_degraded: false,
            voltage: None,
            thermals: None,
        }
    }

    /// Set the PCI bus number
    pub fn with_bus_id(mut self, bus_id: Option<u32>) -> Self {
        self.bus_id = bus_id;
        self
    }

    /// Mark the thermal mask as degraded
    pub fn with_mask_degraded(mut self, degraded: bool) -> Self {
        self.mask_degraded = degraded;
        self
    }

    /// Set the voltage reading
    pub fn with_voltage(mut self, voltage: Option<Voltage>) -> Self {
        self.voltage = voltage;
        self
    }

    /// Set the thermal readings
    pub fn with_thermals(mut self, thermals: Option<ThermalReadings>) -> Self {
        self.thermals = thermals;
        self
    }
}

impl fmt::Display for GpuStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU {}", self.index)
    }
}
