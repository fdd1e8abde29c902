//! NVAPI status codes

use crate::nvapi::ffi::RawStatus;
use std::fmt;

/// Status returned by an NVAPI entry point (`NvAPI_Status`)
///
/// Zero is success; every other value is a failure. Displayed the way the
/// driver documents it: as an unsigned 32-bit hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NvStatus(RawStatus);

impl NvStatus {
    pub const OK: NvStatus = NvStatus(0);
    pub const ERROR: NvStatus = NvStatus(-1);
    pub const NOT_SUPPORTED: NvStatus = NvStatus(-104);

    /// Wrap a raw status value
    pub const fn from_raw(raw: RawStatus) -> Self {
        Self(raw)
    }

    /// Get the raw status value
    #[inline]
    pub const fn as_raw(self) -> RawStatus {
        self.0
    }

    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Symbolic name for well-known public NVAPI statuses
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "NVAPI_OK",
            -1 => "NVAPI_ERROR",
            -2 => "NVAPI_LIBRARY_NOT_FOUND",
            -3 => "NVAPI_NO_IMPLEMENTATION",
            -4 => "NVAPI_API_NOT_INITIALIZED",
            -5 => "NVAPI_INVALID_ARGUMENT",
            -6 => "NVAPI_NVIDIA_DEVICE_NOT_FOUND",
            -7 => "NVAPI_END_ENUMERATION",
            -8 => "NVAPI_INVALID_HANDLE",
            -9 => "NVAPI_INCOMPATIBLE_STRUCT_VERSION",
            -10 => "NVAPI_HANDLE_INVALIDATED",
            -101 => "NVAPI_EXPECTED_PHYSICAL_GPU_HANDLE",
            -104 => "NVAPI_NOT_SUPPORTED",
            _ => return None,
        };
        Some(name)
    }

    /// Convert into a `Result`, mapping failure through `err`
    pub fn check<E>(self, err: impl FnOnce(NvStatus) -> E) -> Result<(), E> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(err(self))
        }
    }
}

impl fmt::Display for NvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0 as u32)?;
        if let Some(name) = self.name() {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}

impl From<RawStatus> for NvStatus {
    fn from(raw: RawStatus) -> Self {
        Self::from_raw(raw)
    }
}
