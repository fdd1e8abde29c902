//! NVAPI abstraction layer
//!
//! Provides typed access to the NVAPI driver entry points and a trait-based
//! seam over them for testability.

pub mod ffi;
pub mod library;
pub mod session;
pub mod status;
pub mod traits;

pub use ffi::{
    GpuHandle, NvApiThermals, NvApiVoltage, QueryId, NVAPI_LIBRARY, NVAPI_MAX_PHYSICAL_GPUS,
};
pub use library::NvapiLibrary;
pub use session::{LifecycleState, NvapiSession};
pub use status::NvStatus;
pub use traits::NvapiDriver;
