//! Mock implementations for testing
//!
//! Provides a scripted NVAPI driver for unit testing without real hardware.

use crate::error::NvapiError;
use crate::nvapi::ffi::{HOTSPOT_SLOT, MEMORY_SLOT, THERMAL_SLOTS};
use crate::nvapi::{
    GpuHandle, NvApiThermals, NvApiVoltage, NvStatus, NvapiDriver, QueryId,
    NVAPI_MAX_PHYSICAL_GPUS,
};

use std::collections::HashSet;
use std::ffi::c_void;
use std::sync::{Arc, Mutex};

/// Calls observed by a [`MockNvapi`], shared with the test
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    pub initialize_calls: u32,
    pub unload_calls: u32,
    /// Times the mock driver itself was dropped (library released)
    pub releases: u32,
    pub enumerate_calls: u32,
    /// Mask of every thermals request, in call order
    pub thermal_masks: Vec<u32>,
    pub voltage_calls: u32,
}

/// Mock physical GPU
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// First thermal mask bit the device rejects; `None` supports all 32
    first_unsupported_bit: Option<u32>,
    /// Forced status for multi-bit thermal reads
    thermals_read_status: NvStatus,
    values: [i32; THERMAL_SLOTS],
    voltage: Result<u32, NvStatus>,
    bus_id: Option<u32>,
}

impl MockDevice {
    /// Create a device that supports every thermal bit and reports no data
    pub fn new() -> Self {
        Self {
            first_unsupported_bit: None,
            thermals_read_status: NvStatus::OK,
            values: [0; THERMAL_SLOTS],
            voltage: Ok(0),
            bus_id: None,
        }
    }

    /// Builder: reject thermal bits at and above `bit`
    pub fn with_first_unsupported_bit(mut self, bit: u32) -> Self {
        self.first_unsupported_bit = Some(bit);
        self
    }

    /// Builder: fail thermal reads whose mask has more than one bit set
    pub fn with_thermals_read_status(mut self, status: NvStatus) -> Self {
        self.thermals_read_status = status;
        self
    }

    /// Builder: raw hotspot slot value (°C × 256)
    pub fn with_hotspot_raw(mut self, raw: i32) -> Self {
        self.values[HOTSPOT_SLOT] = raw;
        self
    }

    /// Builder: raw memory slot value (°C × 256)
    pub fn with_memory_raw(mut self, raw: i32) -> Self {
        self.values[MEMORY_SLOT] = raw;
        self
    }

    /// Builder: core voltage in microvolts
    pub fn with_voltage_uv(mut self, microvolts: u32) -> Self {
        self.voltage = Ok(microvolts);
        self
    }

    /// Builder: make the voltage call fail
    pub fn with_voltage_status(mut self, status: NvStatus) -> Self {
        self.voltage = Err(status);
        self
    }

    /// Builder: PCI bus number
    pub fn with_bus_id(mut self, bus_id: u32) -> Self {
        self.bus_id = Some(bus_id);
        self
    }

    fn supports(&self, mask: u32) -> bool {
        match self.first_unsupported_bit {
            Some(bit) if bit < 32 => mask >> bit == 0,
            _ => true,
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock NVAPI driver for testing
pub struct MockNvapi {
    devices: Vec<MockDevice>,
    initialize_status: NvStatus,
    unload_status: NvStatus,
    enumerate_status: NvStatus,
    missing: HashSet<QueryId>,
    log: Arc<Mutex<CallLog>>,
}

impl MockNvapi {
    /// Create a mock driver exposing the given devices
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            initialize_status: NvStatus::OK,
            unload_status: NvStatus::OK,
            enumerate_status: NvStatus::OK,
            missing: HashSet::new(),
            log: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    /// Builder: status returned by NvAPI_Initialize
    pub fn with_initialize_status(mut self, status: NvStatus) -> Self {
        self.initialize_status = status;
        self
    }

    /// Builder: status returned by NvAPI_Unload
    pub fn with_unload_status(mut self, status: NvStatus) -> Self {
        self.unload_status = status;
        self
    }

    /// Builder: status returned by NvAPI_EnumPhysicalGPUs
    pub fn with_enumerate_status(mut self, status: NvStatus) -> Self {
        self.enumerate_status = status;
        self
    }

    /// Builder: pretend the driver does not export this entry point
    pub fn without_entry_point(mut self, id: QueryId) -> Self {
        self.missing.insert(id);
        self
    }

    /// Shared handle to the call log
    pub fn call_log(&self) -> Arc<Mutex<CallLog>> {
        Arc::clone(&self.log)
    }

    /// Handle the mock hands out for the device at `index`
    pub fn handle_for(index: usize) -> GpuHandle {
        GpuHandle::from_raw((index + 1) as *mut c_void)
    }

    fn entry_point(&self, id: QueryId) -> Result<(), NvapiError> {
        if self.missing.contains(&id) {
            Err(NvapiError::ResolutionFailed(id))
        } else {
            Ok(())
        }
    }

    fn device(&self, gpu: GpuHandle) -> Option<&MockDevice> {
        (gpu.as_raw() as usize)
            .checked_sub(1)
            .and_then(|index| self.devices.get(index))
    }
}

impl Drop for MockNvapi {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.releases += 1;
        }
    }
}

impl NvapiDriver for MockNvapi {
    fn initialize(&mut self) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::Initialize)?;
        self.log.lock().unwrap().initialize_calls += 1;
        Ok(self.initialize_status)
    }

    fn unload(&mut self) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::Unload)?;
        self.log.lock().unwrap().unload_calls += 1;
        Ok(self.unload_status)
    }

    fn enum_physical_gpus(
        &self,
        handles: &mut [GpuHandle; NVAPI_MAX_PHYSICAL_GPUS],
        count: &mut u32,
    ) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::EnumPhysicalGpus)?;
        self.log.lock().unwrap().enumerate_calls += 1;

        if !self.enumerate_status.is_ok() {
            return Ok(self.enumerate_status);
        }

        for (index, slot) in handles.iter_mut().take(self.devices.len()).enumerate() {
            *slot = Self::handle_for(index);
        }
        // Reports the full count even past the buffer size
        *count = self.devices.len() as u32;
        Ok(NvStatus::OK)
    }

    fn get_thermals(
        &self,
        gpu: GpuHandle,
        thermals: &mut NvApiThermals,
    ) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::GetThermals)?;
        self.log.lock().unwrap().thermal_masks.push(thermals.mask);

        let Some(device) = self.device(gpu) else {
            return Ok(NvStatus::from_raw(-8));
        };
        if thermals.version != NvApiThermals::VERSION {
            return Ok(NvStatus::from_raw(-9));
        }
        if !device.supports(thermals.mask) {
            return Ok(NvStatus::NOT_SUPPORTED);
        }
        if thermals.mask.count_ones() > 1 && !device.thermals_read_status.is_ok() {
            return Ok(device.thermals_read_status);
        }

        thermals.values = device.values;
        Ok(NvStatus::OK)
    }

    fn get_voltage(
        &self,
        gpu: GpuHandle,
        voltage: &mut NvApiVoltage,
    ) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::GetVoltage)?;
        self.log.lock().unwrap().voltage_calls += 1;

        let Some(device) = self.device(gpu) else {
            return Ok(NvStatus::from_raw(-8));
        };
        if voltage.version != NvApiVoltage::VERSION {
            return Ok(NvStatus::from_raw(-9));
        }

        match device.voltage {
            Ok(microvolts) => {
                voltage.value_uv = microvolts;
                Ok(NvStatus::OK)
            }
            Err(status) => Ok(status),
        }
    }

    fn get_bus_id(&self, gpu: GpuHandle, bus_id: &mut u32) -> Result<NvStatus, NvapiError> {
        self.entry_point(QueryId::GetBusId)?;

        match self.device(gpu).and_then(|d| d.bus_id) {
            Some(id) => {
                *bus_id = id;
                Ok(NvStatus::OK)
            }
            None => Ok(NvStatus::NOT_SUPPORTED),
        }
    }

    fn error_message(&self, status: NvStatus) -> Option<String> {
        self.entry_point(QueryId::GetErrorMessage).ok()?;
        Some(format!("mock error {}", status.as_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_support() {
        let device = MockDevice::new().with_first_unsupported_bit(9);
        assert!(device.supports(1 << 8));
        assert!(device.supports(0x1ff));
        assert!(!device.supports(1 << 9));
        assert!(!device.supports(0x3ff));
    }

    #[test]
    fn test_mock_device_supports_all_bits_by_default() {
        let device = MockDevice::new();
        assert!(device.supports(1 << 31));
        assert!(device.supports(u32::MAX));
    }

    #[test]
    fn test_mock_handles_map_back_to_devices() {
        let mock = MockNvapi::new(vec![MockDevice::new(), MockDevice::new().with_bus_id(3)]);
        let mut bus_id = 0;
        let status = mock.get_bus_id(MockNvapi::handle_for(1), &mut bus_id).unwrap();
        assert!(status.is_ok());
        assert_eq!(bus_id, 3);
        assert!(mock.device(GpuHandle::null()).is_none());
    }

    #[test]
    fn test_mock_rejects_bad_version() {
        let mock = MockNvapi::new(vec![MockDevice::new()]);
        let mut request = NvApiThermals::request(1);
        request.version = 0;
        let status = mock.get_thermals(MockNvapi::handle_for(0), &mut request).unwrap();
        assert_eq!(status, NvStatus::from_raw(-9));
    }

    #[test]
    fn test_mock_missing_entry_point() {
        let mock =
            MockNvapi::new(vec![MockDevice::new()]).without_entry_point(QueryId::GetVoltage);
        let mut request = NvApiVoltage::request();
        let result = mock.get_voltage(MockNvapi::handle_for(0), &mut request);
        assert_eq!(
            result.unwrap_err(),
            NvapiError::ResolutionFailed(QueryId::GetVoltage)
        );
    }
}
