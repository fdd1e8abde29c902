//! NVAPI interface lifecycle
//!
//! [`NvapiSession`] owns a loaded driver for as long as it is in use. Opening
//! a session initializes the driver; dropping it unloads and releases the
//! driver exactly once, on every exit path.

use crate::error::NvapiError;
use crate::nvapi::ffi::{GpuHandle, NVAPI_MAX_PHYSICAL_GPUS};
use crate::nvapi::status::NvStatus;
use crate::nvapi::traits::NvapiDriver;

/// Lifecycle state of the driver interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Library opened, NvAPI_Initialize not yet called (or failed)
    Loaded,
    /// NvAPI_Initialize succeeded
    Initialized,
    /// NvAPI_Unload issued, library about to be released
    ShuttingDown,
}

/// An open NVAPI interface
pub struct NvapiSession<D: NvapiDriver> {
    driver: D,
    state: LifecycleState,
}

impl<D: NvapiDriver> NvapiSession<D> {
    /// Take ownership of a loaded driver and initialize it
    ///
    /// If initialization fails the driver is unloaded and released before
    /// the error is returned.
    pub fn open(driver: D) -> Result<Self, NvapiError> {
        let mut session = Self {
            driver,
            state: LifecycleState::Loaded,
        };
        session.initialize()?;
        Ok(session)
    }

    fn initialize(&mut self) -> Result<(), NvapiError> {
        let status = self.driver.initialize()?;
        status.check(NvapiError::InitializationFailed)?;
        self.state = LifecycleState::Initialized;
        log::debug!("NVAPI initialized");
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Enumerate physical GPUs in driver order
    pub fn enumerate(&self) -> Result<Vec<GpuHandle>, NvapiError> {
        let mut handles = [GpuHandle::null(); NVAPI_MAX_PHYSICAL_GPUS];
        let mut count = 0u32;

        self.driver
            .enum_physical_gpus(&mut handles, &mut count)?
            .check(NvapiError::EnumerationFailed)?;

        let count = (count as usize).min(NVAPI_MAX_PHYSICAL_GPUS);
        log::debug!("Enumerated {} physical GPU(s)", count);
        Ok(handles[..count].to_vec())
    }

    /// Format a status together with the driver's own description of it
    pub fn describe(&self, status: NvStatus) -> String {
        match self.driver.error_message(status) {
            Some(message) => format!("{}: {}", status, message),
            None => status.to_string(),
        }
    }

    /// Unload and release the driver now
    pub fn close(self) {
        drop(self);
    }

    fn shutdown(&mut self) {
        if self.state == LifecycleState::ShuttingDown {
            return;
        }
        self.state = LifecycleState::ShuttingDown;

        match self.driver.unload() {
            Ok(status) if status.is_ok() => log::debug!("NVAPI unloaded"),
            Ok(status) => log::warn!("NvAPI_Unload failed with status {}", status),
            Err(e) => log::warn!("{}", e),
        }
    }
}

impl<D: NvapiDriver> Drop for NvapiSession<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
