//! Trait definitions for NVAPI driver calls
//!
//! This trait abstracts the raw driver entry points to enable testing with
//! mocks. Implementations only forward calls: the `Err` side means the entry
//! point could not be resolved, `Ok` carries whatever status the driver
//! returned. Interpreting that status is left to the services layer.

use crate::error::NvapiError;
use crate::nvapi::ffi::{GpuHandle, NvApiThermals, NvApiVoltage, NVAPI_MAX_PHYSICAL_GPUS};
use crate::nvapi::status::NvStatus;

/// A loaded NVAPI driver interface
///
/// Dropping the implementor releases the underlying library.
pub trait NvapiDriver {
    /// NvAPI_Initialize
    fn initialize(&mut self) -> Result<NvStatus, NvapiError>;

    /// NvAPI_Unload
    fn unload(&mut self) -> Result<NvStatus, NvapiError>;

    /// NvAPI_EnumPhysicalGPUs
    ///
    /// `count` receives the number of valid handles written.
    fn enum_physical_gpus(
        &self,
        handles: &mut [GpuHandle; NVAPI_MAX_PHYSICAL_GPUS],
        count: &mut u32,
    ) -> Result<NvStatus, NvapiError>;

    /// Undocumented thermals query
    fn get_thermals(
        &self,
        gpu: GpuHandle,
        thermals: &mut NvApiThermals,
    ) -> Result<NvStatus, NvapiError>;

    /// Undocumented core voltage query
    fn get_voltage(
        &self,
        gpu: GpuHandle,
        voltage: &mut NvApiVoltage,
    ) -> Result<NvStatus, NvapiError>;

    /// NvAPI_GPU_GetBusId
    fn get_bus_id(&self, gpu: GpuHandle, bus_id: &mut u32) -> Result<NvStatus, NvapiError>;

    /// NvAPI_GetErrorMessage
    ///
    /// Returns `None` when the driver has no text for this status.
    fn error_message(&self, status: NvStatus) -> Option<String>;
}
