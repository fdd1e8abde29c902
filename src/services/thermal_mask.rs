//! Thermal mask discovery
//!
//! GPUs answer for different subsets of the thermal slots, and querying an
//! unsupported bit fails instead of returning zeros. The usable mask is
//! found by probing one bit at a time.

use crate::domain::ThermalMask;
use crate::error::NvapiError;
use crate::nvapi::{GpuHandle, NvApiThermals, NvStatus, NvapiDriver};

/// Result of probing a GPU's thermal mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskProbe {
    pub mask: ThermalMask,
    /// Set when the probe could not run and the mask fell back to bit 0
    pub warning: Option<NvapiError>,
}

impl MaskProbe {
    /// Whether the mask is a fallback rather than a probed value
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

fn query<D: NvapiDriver>(driver: &D, gpu: GpuHandle, mask: u32) -> Result<NvStatus, NvapiError> {
    let mut request = NvApiThermals::request(mask);
    driver.get_thermals(gpu, &mut request)
}

/// Discover which thermal mask bits `gpu` supports
///
/// Bits are probed individually from bit 0 upwards; the first rejected bit
/// `b` yields a mask of every bit below `b`. Never fails: if even bit 0 is
/// rejected the mask degrades to [`ThermalMask::MINIMAL`] with a warning.
pub fn probe_thermal_mask<D: NvapiDriver>(driver: &D, gpu: GpuHandle) -> MaskProbe {
    let degraded = |warning: NvapiError| MaskProbe {
        mask: ThermalMask::MINIMAL,
        warning: Some(warning),
    };

    match query(driver, gpu, 1) {
        Ok(status) if status.is_ok() => {}
        Ok(status) => return degraded(NvapiError::ThermalProbeDegraded(status)),
        Err(e) => return degraded(e),
    }

    for bit in 0..u32::BITS {
        let accepted = matches!(query(driver, gpu, 1 << bit), Ok(status) if status.is_ok());
        if !accepted {
            log::debug!("Thermal mask bit {} rejected", bit);
            return MaskProbe {
                mask: ThermalMask::below(bit),
                warning: None,
            };
        }
    }

    MaskProbe {
        mask: ThermalMask::ALL,
        warning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDevice, MockNvapi};
    use crate::nvapi::QueryId;

    fn probe(device: MockDevice) -> MaskProbe {
        let mock = MockNvapi::new(vec![device]);
        probe_thermal_mask(&mock, MockNvapi::handle_for(0))
    }

    #[test]
    fn test_first_unsupported_bit_sets_mask() {
        for bit in 1..32 {
            let result = probe(MockDevice::new().with_first_unsupported_bit(bit));
            assert_eq!(result.mask.bits(), (1u32 << bit) - 1, "bit {}", bit);
            assert!(!result.is_degraded());
        }
    }

    #[test]
    fn test_bit_nine_gives_0x1ff() {
        let result = probe(MockDevice::new().with_first_unsupported_bit(9));
        assert_eq!(result.mask.to_string(), "0x000001ff");
    }

    #[test]
    fn test_all_bits_supported() {
        let result = probe(MockDevice::new());
        assert_eq!(result.mask, ThermalMask::ALL);
        assert_eq!(result.mask.bits(), 0xFFFF_FFFF);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_rejected_minimal_probe_degrades() {
        let result = probe(MockDevice::new().with_first_unsupported_bit(0));
        assert_eq!(result.mask, ThermalMask::MINIMAL);
        assert_eq!(
            result.warning,
            Some(NvapiError::ThermalProbeDegraded(NvStatus::NOT_SUPPORTED))
        );
    }

    #[test]
    fn test_missing_entry_point_degrades() {
        let mock =
            MockNvapi::new(vec![MockDevice::new()]).without_entry_point(QueryId::GetThermals);
        let result = probe_thermal_mask(&mock, MockNvapi::handle_for(0));
        assert_eq!(result.mask, ThermalMask::MINIMAL);
        assert!(result.is_degraded());
    }

    #[test]
    fn test_probes_single_bits_in_order() {
        let mock = MockNvapi::new(vec![MockDevice::new().with_first_unsupported_bit(3)]);
        let log = mock.call_log();
        probe_thermal_mask(&mock, MockNvapi::handle_for(0));

        assert_eq!(log.lock().unwrap().thermal_masks, vec![1, 1, 2, 4, 8]);
    }
}
