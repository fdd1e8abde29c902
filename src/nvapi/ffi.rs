//! Raw NVAPI definitions
//!
//! Query-interface IDs, entry point signatures and the fixed-layout request
//! records exchanged with `libnvidia-api.so.1`. The record layouts must match
//! the driver byte for byte, padding included.

use std::ffi::{c_char, c_void};
use std::fmt;

/// Default name of the NVAPI shared library on Linux
pub const NVAPI_LIBRARY: &str = "libnvidia-api.so.1";

/// Exported symbol used to look up every other entry point
pub const QUERY_INTERFACE_SYMBOL: &[u8] = b"nvapi_QueryInterface\0";

/// Upper bound on physical GPU handles returned by enumeration
pub const NVAPI_MAX_PHYSICAL_GPUS: usize = 64;

/// Buffer size for NvAPI_GetErrorMessage
pub const NVAPI_SHORT_STRING_MAX: usize = 64;

/// Number of temperature slots in a thermals record
pub const THERMAL_SLOTS: usize = 40;

/// Slot holding the hotspot temperature
pub const HOTSPOT_SLOT: usize = 9;

/// Slot holding the memory (VRAM) temperature
pub const MEMORY_SLOT: usize = 15;

const THERMALS_PROTOCOL_VERSION: u32 = 2;
const VOLTAGE_PROTOCOL_VERSION: u32 = 1;

/// Entry points this crate knows how to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryId {
    Initialize,
    Unload,
    EnumPhysicalGpus,
    GetBusId,
    GetErrorMessage,
    /// Undocumented
    GetThermals,
    /// Undocumented
    GetVoltage,
}

impl QueryId {
    /// Opaque identifier passed to `nvapi_QueryInterface`
    pub const fn id(self) -> u32 {
        match self {
            QueryId::Initialize => 0x0150_e828,
            QueryId::Unload => 0xd22b_dd7e,
            QueryId::EnumPhysicalGpus => 0xe5ac_921f,
            QueryId::GetBusId => 0x1be0_b8e5,
            QueryId::GetErrorMessage => 0x6c2d_048c,
            QueryId::GetThermals => 0x65fe_3aad,
            QueryId::GetVoltage => 0x465f_9bcf,
        }
    }

    /// Human-readable entry point name
    pub const fn name(self) -> &'static str {
        match self {
            QueryId::Initialize => "NvAPI_Initialize",
            QueryId::Unload => "NvAPI_Unload",
            QueryId::EnumPhysicalGpus => "NvAPI_EnumPhysicalGPUs",
            QueryId::GetBusId => "NvAPI_GPU_GetBusId",
            QueryId::GetErrorMessage => "NvAPI_GetErrorMessage",
            QueryId::GetThermals => "NvAPI_GPU_GetThermals",
            QueryId::GetVoltage => "NvAPI_GPU_GetVoltage",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID 0x{:08x})", self.name(), self.id())
    }
}

/// Opaque physical GPU handle (`NvPhysicalGpuHandle`)
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuHandle(*mut c_void);

impl GpuHandle {
    /// Null handle used to pre-fill enumeration buffers
    pub const fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    /// Wrap a raw driver handle
    pub const fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    /// Get the raw driver handle
    pub const fn as_raw(self) -> *mut c_void {
        self.0
    }
}

/// Version tag layout shared by all versioned NVAPI records
pub const fn make_version(record_size: usize, protocol_version: u32) -> u32 {
    record_size as u32 | (protocol_version << 16)
}

/// Thermals request/response record (protocol version 2)
///
/// Temperatures are stored as degrees Celsius × 256.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NvApiThermals {
    pub version: u32,
    pub mask: u32,
    pub values: [i32; THERMAL_SLOTS],
}

impl NvApiThermals {
    pub const VERSION: u32 = make_version(
        std::mem::size_of::<NvApiThermals>(),
        THERMALS_PROTOCOL_VERSION,
    );

    /// Zeroed request querying the given sensor mask
    pub fn request(mask: u32) -> Self {
        Self {
            version: Self::VERSION,
            mask,
            values: [0; THERMAL_SLOTS],
        }
    }
}

/// Voltage request/response record (protocol version 1)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NvApiVoltage {
    pub version: u32,
    pub flags: u32,
    pub padding_1: [u32; 8],
    pub value_uv: u32,
    pub padding_2: [u32; 8],
}

impl NvApiVoltage {
    pub const VERSION: u32 = make_version(
        std::mem::size_of::<NvApiVoltage>(),
        VOLTAGE_PROTOCOL_VERSION,
    );

    /// Zeroed request
    pub fn request() -> Self {
        Self {
            version: Self::VERSION,
            flags: 0,
            padding_1: [0; 8],
            value_uv: 0,
            padding_2: [0; 8],
        }
    }
}

const _: () = assert!(std::mem::size_of::<NvApiThermals>() == 168);
const _: () = assert!(std::mem::size_of::<NvApiVoltage>() == 76);
const _: () = assert!(std::mem::offset_of!(NvApiVoltage, value_uv) == 40);

pub type RawStatus = i32;

pub type QueryInterfaceFn = unsafe extern "C" fn(id: u32) -> *mut c_void;
pub type InitializeFn = unsafe extern "C" fn() -> RawStatus;
pub type UnloadFn = unsafe extern "C" fn() -> RawStatus;
pub type EnumPhysicalGpusFn =
    unsafe extern "C" fn(handles: *mut GpuHandle, count: *mut u32) -> RawStatus;
pub type GetBusIdFn = unsafe extern "C" fn(handle: GpuHandle, bus_id: *mut u32) -> RawStatus;
pub type GetErrorMessageFn =
    unsafe extern "C" fn(status: RawStatus, text: *mut c_char) -> RawStatus;
pub type GetThermalsFn =
    unsafe extern "C" fn(handle: GpuHandle, thermals: *mut NvApiThermals) -> RawStatus;
pub type GetVoltageFn =
    unsafe extern "C" fn(handle: GpuHandle, voltage: *mut NvApiVoltage) -> RawStatus;
