//! NVAPI library loading and entry-point resolution
//!
//! `libnvidia-api.so.1` exports a single symbol, `nvapi_QueryInterface`,
//! which maps an opaque 32-bit ID to an entry point. Every entry point this
//! crate uses is resolved once, at load time, into a typed [`FunctionTable`].

use crate::error::NvapiError;
use crate::nvapi::ffi::{
    EnumPhysicalGpusFn, GetBusIdFn, GetErrorMessageFn, GetThermalsFn, GetVoltageFn, GpuHandle,
    InitializeFn, NvApiThermals, NvApiVoltage, QueryId, QueryInterfaceFn, UnloadFn,
    NVAPI_MAX_PHYSICAL_GPUS, NVAPI_SHORT_STRING_MAX, QUERY_INTERFACE_SYMBOL,
};
use crate::nvapi::status::NvStatus;
use crate::nvapi::traits::NvapiDriver;

use libloading::{Library, Symbol};
use std::ffi::{c_char, c_void, CStr};
use std::ptr::NonNull;

/// Looks up entry points through `nvapi_QueryInterface`
struct Resolver {
    query_interface: QueryInterfaceFn,
}

impl Resolver {
    /// Resolve `id` to an untyped entry point
    fn resolve(&self, id: QueryId) -> Result<NonNull<c_void>, NvapiError> {
        // SAFETY: nvapi_QueryInterface takes any u32 and returns null for
        // unknown IDs.
        let ptr = unsafe { (self.query_interface)(id.id()) };
        let entry = NonNull::new(ptr).ok_or(NvapiError::ResolutionFailed(id))?;
        log::debug!("Resolved {} at {:p}", id, entry);
        Ok(entry)
    }

    /// Resolve `id` and reinterpret it as the function pointer type `F`
    ///
    /// # Safety
    /// `F` must be the `unsafe extern "C" fn` signature the driver uses for
    /// this ID.
    unsafe fn resolve_as<F: Copy>(&self, id: QueryId) -> Result<F, NvapiError> {
        const {
            assert!(std::mem::size_of::<F>() == std::mem::size_of::<*mut c_void>());
        }
        let entry = self.resolve(id)?.as_ptr();
        Ok(std::mem::transmute_copy::<*mut c_void, F>(&entry))
    }

    /// Like `resolve_as`, but a missing entry point is not an error yet
    unsafe fn resolve_optional<F: Copy>(&self, id: QueryId) -> Option<F> {
        match self.resolve_as(id) {
            Ok(f) => Some(f),
            Err(e) => {
                log::debug!("{}", e);
                None
            }
        }
    }
}

/// Typed NVAPI entry points
///
/// `Initialize` and `EnumPhysicalGPUs` are required. Everything else is
/// optional: a driver lacking a sensor entry only loses that reading, and a
/// missing `Unload` only skips the unload call.
#[derive(Clone, Copy)]
pub struct FunctionTable {
    initialize: InitializeFn,
    unload: Option<UnloadFn>,
    enum_physical_gpus: EnumPhysicalGpusFn,
    get_bus_id: Option<GetBusIdFn>,
    get_error_message: Option<GetErrorMessageFn>,
    get_thermals: Option<GetThermalsFn>,
    get_voltage: Option<GetVoltageFn>,
}

impl FunctionTable {
    fn resolve(resolver: &Resolver) -> Result<Self, NvapiError> {
        // SAFETY: every signature below matches the driver's declaration for
        // the corresponding query ID.
        unsafe {
            Ok(Self {
                initialize: resolver.resolve_as(QueryId::Initialize)?,
                unload: resolver.resolve_optional(QueryId::Unload),
                enum_physical_gpus: resolver.resolve_as(QueryId::EnumPhysicalGpus)?,
                get_bus_id: resolver.resolve_optional(QueryId::GetBusId),
                get_error_message: resolver.resolve_optional(QueryId::GetErrorMessage),
                get_thermals: resolver.resolve_optional(QueryId::GetThermals),
                get_voltage: resolver.resolve_optional(QueryId::GetVoltage),
            })
        }
    }
}

/// The dynamically loaded NVAPI library
pub struct NvapiLibrary {
    table: FunctionTable,
    name: String,
    // Must outlive every pointer in `table`
    _lib: Library,
}

impl NvapiLibrary {
    /// Load NVAPI from a specific library name or path
    pub fn load_from(name: &str) -> Result<Self, NvapiError> {
        let not_found = |reason: String| NvapiError::DriverNotFound {
            library: name.to_string(),
            reason,
        };

        // SAFETY: Loading the vendor library runs its initializers, which is
        // the only way to reach NVAPI.
        let lib = unsafe { Library::new(name) }.map_err(|e| not_found(e.to_string()))?;

        // SAFETY: nvapi_QueryInterface has the QueryInterfaceFn signature.
        let query_interface: QueryInterfaceFn = {
            let symbol: Symbol<QueryInterfaceFn> = unsafe { lib.get(QUERY_INTERFACE_SYMBOL) }
                .map_err(|e| {
                    not_found(format!("Could not find nvapi_QueryInterface: {}", e))
                })?;
            *symbol
        };

        let table = FunctionTable::resolve(&Resolver { query_interface })?;
        log::debug!("Loaded {}", name);

        Ok(Self {
            table,
            name: name.to_string(),
            _lib: lib,
        })
    }
}

impl Drop for NvapiLibrary {
    fn drop(&mut self) {
        log::debug!("Releasing {}", self.name);
    }
}

impl NvapiDriver for NvapiLibrary {
    fn initialize(&mut self) -> Result<NvStatus, NvapiError> {
        // SAFETY: no arguments; resolved from the loaded library.
        Ok(unsafe { (self.table.initialize)() }.into())
    }

    fn unload(&mut self) -> Result<NvStatus, NvapiError> {
        let f = self
            .table
            .unload
            .ok_or(NvapiError::ResolutionFailed(QueryId::Unload))?;
        // SAFETY: no arguments; resolved from the loaded library.
        Ok(unsafe { f() }.into())
    }

    fn enum_physical_gpus(
        &self,
        handles: &mut [GpuHandle; NVAPI_MAX_PHYSICAL_GPUS],
        count: &mut u32,
    ) -> Result<NvStatus, NvapiError> {
        // SAFETY: the driver writes at most NVAPI_MAX_PHYSICAL_GPUS handles.
        Ok(unsafe { (self.table.enum_physical_gpus)(handles.as_mut_ptr(), count) }.into())
    }

    fn get_thermals(
        &self,
        gpu: GpuHandle,
        thermals: &mut NvApiThermals,
    ) -> Result<NvStatus, NvapiError> {
        let f = self
            .table
            .get_thermals
            .ok_or(NvapiError::ResolutionFailed(QueryId::GetThermals))?;
        // SAFETY: `thermals` is a correctly sized, versioned record.
        Ok(unsafe { f(gpu, thermals) }.into())
    }

    fn get_voltage(
        &self,
        gpu: GpuHandle,
        voltage: &mut NvApiVoltage,
    ) -> Result<NvStatus, NvapiError> {
        let f = self
            .table
            .get_voltage
            .ok_or(NvapiError::ResolutionFailed(QueryId::GetVoltage))?;
        // SAFETY: `voltage` is a correctly sized, versioned record.
        Ok(unsafe { f(gpu, voltage) }.into())
    }

    fn get_bus_id(&self, gpu: GpuHandle, bus_id: &mut u32) -> Result<NvStatus, NvapiError> {
        let f = self
            .table
            .get_bus_id
            .ok_or(NvapiError::ResolutionFailed(QueryId::GetBusId))?;
        // SAFETY: `bus_id` is a valid out-pointer.
        Ok(unsafe { f(gpu, bus_id) }.into())
    }

    fn error_message(&self, status: NvStatus) -> Option<String> {
        let f = self.table.get_error_message?;
        let mut text: [c_char; NVAPI_SHORT_STRING_MAX] = [0; NVAPI_SHORT_STRING_MAX];

        // SAFETY: the driver writes a NUL-terminated string of at most
        // NVAPI_SHORT_STRING_MAX bytes.
        let result = NvStatus::from(unsafe { f(status.as_raw(), text.as_mut_ptr()) });
        if !result.is_ok() {
            return None;
        }
        text[NVAPI_SHORT_STRING_MAX - 1] = 0;

        // SAFETY: the buffer is NUL-terminated (enforced above).
        let message = unsafe { CStr::from_ptr(text.as_ptr()) }
            .to_string_lossy()
            .trim()
            .to_string();
        (!message.is_empty()).then_some(message)
    }
}
