//! Per-GPU sensor readers
//!
//! Reads and decodes voltage and thermals for one device at a time.
//! Failures here are local: they are logged and turn into "not available"
//! in the report, never into an error for the whole run.

use crate::domain::{GpuStats, ThermalMask, ThermalReadings, Voltage};
use crate::error::NvapiError;
use crate::nvapi::ffi::{HOTSPOT_SLOT, MEMORY_SLOT};
use crate::nvapi::{GpuHandle, NvApiThermals, NvApiVoltage, NvapiDriver, NvapiSession};
use crate::services::thermal_mask::probe_thermal_mask;

/// Service reading sensors through an open session
pub struct SensorProbe<'a, D: NvapiDriver> {
    session: &'a NvapiSession<D>,
}

impl<'a, D: NvapiDriver> SensorProbe<'a, D> {
    /// Create a new sensor probe
    pub fn new(session: &'a NvapiSession<D>) -> Self {
        Self { session }
    }

    /// Read the core voltage
    pub fn read_voltage(&self, gpu: GpuHandle) -> Result<Voltage, NvapiError> {
        let mut request = NvApiVoltage::request();
        self.session
            .driver()
            .get_voltage(gpu, &mut request)?
            .check(NvapiError::VoltageUnavailable)?;

        Ok(Voltage::from_microvolts(request.value_uv))
    }

    /// Read hotspot and memory temperatures using a previously probed mask
    pub fn read_thermals(
        &self,
        gpu: GpuHandle,
        mask: ThermalMask,
    ) -> Result<ThermalReadings, NvapiError> {
        let mut request = NvApiThermals::request(mask.bits());
        self.session
            .driver()
            .get_thermals(gpu, &mut request)?
            .check(NvapiError::ThermalsUnavailable)?;

        Ok(ThermalReadings::from_raw_slots(
            request.values[HOTSPOT_SLOT],
            request.values[MEMORY_SLOT],
        ))
    }

    /// Read the PCI bus number, if the driver provides it
    pub fn read_bus_id(&self, gpu: GpuHandle) -> Option<u32> {
        let mut bus_id = 0u32;
        match self.session.driver().get_bus_id(gpu, &mut bus_id) {
            Ok(status) if status.is_ok() => Some(bus_id),
            Ok(status) => {
                log::debug!("GetBusId failed with status {}", status);
                None
            }
            Err(e) => {
                log::debug!("{}", e);
                None
            }
        }
    }

    /// Probe the mask, then read every sensor of one GPU
    pub fn collect(&self, index: u32, gpu: GpuHandle) -> GpuStats {
        let probe = probe_thermal_mask(self.session.driver(), gpu);
        if let Some(warning) = &probe.warning {
            self.warn(index, warning);
        }

        let voltage = self
            .read_voltage(gpu)
            .map_err(|e| self.warn(index, &e))
            .ok();

        let thermals = self
            .read_thermals(gpu, probe.mask)
            .map_err(|e| self.warn(index, &e))
            .ok();

        GpuStats::new(index, probe.mask)
            .with_mask_degraded(probe.is_degraded())
            .with_bus_id(self.read_bus_id(gpu))
            .with_voltage(voltage)
            .with_thermals(thermals)
    }

    fn warn(&self, index: u32, err: &NvapiError) {
        match err.status() {
            Some(status) => {
                log::warn!("GPU {}: {} [{}]", index, err, self.session.describe(status))
            }
            None => log::warn!("GPU {}: {}", index, err),
        }
    }
}
