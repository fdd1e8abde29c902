//! Voltage domain type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Core voltage as reported by the driver, in microvolts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Voltage(u32);

impl Voltage {
    /// Create a voltage from microvolts
    pub const fn from_microvolts(microvolts: u32) -> Self {
        Self(microvolts)
    }

    /// Get the voltage in microvolts
    #[inline]
    pub const fn as_microvolts(&self) -> u32 {
        self.0
    }

    /// Get the voltage in volts
    pub fn as_volts(&self) -> f64 {
        f64::from(self.0) / 1_000_000.0
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} V ({} µV)", self.as_volts(), self.as_microvolts())
    }
}
