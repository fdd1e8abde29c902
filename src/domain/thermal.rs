//! Thermal domain types
//!
//! Provides the temperature type, the probed sensor mask and the decoded
//! hotspot/memory readings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale of NVAPI thermal slots (°C × 256)
pub const THERMAL_FIXED_POINT_SCALE: i32 = 256;

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Temperature(i32);

impl Temperature {
    /// Create a new Temperature
    pub const fn new(celsius: i32) -> Self {
        Self(celsius)
    }

    /// Decode a raw thermal slot value
    ///
    /// The slot holds °C × 256; the integer part is kept. Only values in the
    /// open interval (0, 255) count as a real sensor: 0 and anything at or
    /// above 255 mean the sensor is not present.
    pub fn from_raw_slot(raw: i32) -> Option<Self> {
        let celsius = raw / THERMAL_FIXED_POINT_SCALE;
        (celsius > 0 && celsius < 255).then_some(Self(celsius))
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} °C", self.0)
    }
}

/// Bitmask of thermal sensors a GPU answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThermalMask(u32);

impl ThermalMask {
    /// Fallback when even the bit-0 probe fails
    pub const MINIMAL: ThermalMask = ThermalMask(1);

    /// Every probed bit answered
    pub const ALL: ThermalMask = ThermalMask(u32::MAX);

    /// Create a mask from raw bits
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask with every bit below `bit` set
    pub const fn below(bit: u32) -> Self {
        if bit >= 32 {
            Self::ALL
        } else {
            Self((1u32 << bit) - 1)
        }
    }

    /// Get the raw bits
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ThermalMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Decoded hotspot and memory temperatures
///
/// `None` means the slot did not hold a plausible reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThermalReadings {
    pub hotspot: Option<Temperature>,
    pub memory: Option<Temperature>,
}

impl ThermalReadings {
    /// Decode the raw hotspot and memory slot values
    pub fn from_raw_slots(hotspot_raw: i32, memory_raw: i32) -> Self {
        Self {
            hotspot: Temperature::from_raw_slot(hotspot_raw),
            memory: Temperature::from_raw_slot(memory_raw),
        }
    }
}
