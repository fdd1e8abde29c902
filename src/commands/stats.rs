//! Stats command implementation
//!
//! Loads the driver, opens a session and reports every selected GPU.

use crate::cli::args::OutputFormat;
use crate::cli::output::{banner, write_output, StatsReport};
use crate::config::Config;
use crate::error::{AppError, NvapiError, Result};
use crate::nvapi::{NvapiDriver, NvapiSession};
use crate::services::SensorProbe;

use std::io::Write;

/// Execute the stats command
///
/// `load` acquires the driver; it is only called after the banner has been
/// written. The session is released before `Done.` is printed, and on every
/// error path before the error is returned.
pub fn run_stats<D, L, W>(config: &Config, load: L, out: &mut W) -> Result<()>
where
    D: NvapiDriver,
    L: FnOnce() -> std::result::Result<D, NvapiError>,
    W: Write,
{
    let format = config.general.format;
    let table = matches!(format, OutputFormat::Table);

    if table {
        writeln!(out, "{}", banner(&config.driver.library))?;
    }

    let session = NvapiSession::open(load()?)?;
    if table {
        writeln!(out, "NVAPI initialized successfully.\n")?;
    }

    let handles = session.enumerate()?;
    let selected: Vec<usize> = match config.probe.gpu {
        Some(index) if index as usize >= handles.len() => {
            return Err(AppError::GpuNotFound {
                index,
                count: handles.len(),
            });
        }
        Some(index) => vec![index as usize],
        None => (0..handles.len()).collect(),
    };

    let probe = SensorProbe::new(&session);
    let gpus = selected
        .into_iter()
        .map(|i| probe.collect(i as u32, handles[i]))
        .collect();

    let report = StatsReport {
        gpu_count: handles.len(),
        gpus,
    };
    write_output(out, &report, format)?;

    session.close();
    if table {
        writeln!(out, "Done.")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::mock::{MockDevice, MockNvapi};
    use crate::nvapi::NvStatus;

    fn reference_device() -> MockDevice {
        MockDevice::new()
            .with_first_unsupported_bit(9)
            .with_voltage_uv(1_200_000)
            .with_hotspot_raw(2304)
            .with_memory_raw(12800)
    }

    fn run(config: &Config, mock: MockNvapi) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run_stats(config, || Ok(mock), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_two_devices_end_to_end() {
        let mock = MockNvapi::new(vec![reference_device(), reference_device()]);
        let log = mock.call_log();

        let (result, text) = run(&Config::default(), mock);
        assert!(result.is_ok());

        assert!(text.starts_with("=================================================\n"));
        assert!(text.contains("NVAPI initialized successfully.\n\nFound 2 NVIDIA GPU(s)\n\n"));
        assert_eq!(text.matches("Thermals mask: 0x000001ff").count(), 2);
        assert_eq!(text.matches("Core Voltage: 1.200 V (1200000 µV)").count(), 2);
        assert_eq!(text.matches("Hotspot Temperature: 9 °C").count(), 2);
        assert_eq!(text.matches("Memory Temperature: 50 °C").count(), 2);
        assert!(text.contains("GPU 0:\n"));
        assert!(text.contains("GPU 1:\n"));
        assert!(!text.contains("GPU 2:"));
        assert!(text.ends_with("Memory Temperature: 50 °C\n\nDone.\n"));

        let log = log.lock().unwrap();
        assert_eq!(log.initialize_calls, 1);
        assert_eq!(log.unload_calls, 1);
        assert_eq!(log.releases, 1);
        assert_eq!(log.enumerate_calls, 1);
        // One voltage read per GPU, no retries
        assert_eq!(log.voltage_calls, 2);
        // Per GPU: initial probe, bits 0..=9, then the read with the final mask
        assert_eq!(log.thermal_masks.len(), 2 * 12);
        assert_eq!(log.thermal_masks[11], 0x1ff);
        assert_eq!(log.thermal_masks[23], 0x1ff);
    }

    #[test]
    fn test_load_failure_acquires_nothing() {
        let config = Config::default();
        let mut out = Vec::new();
        let result = run_stats::<MockNvapi, _, _>(
            &config,
            || {
                Err(NvapiError::DriverNotFound {
                    library: "libnvidia-api.so.1".to_string(),
                    reason: "not found".to_string(),
                })
            },
            &mut out,
        );

        assert!(matches!(
            result,
            Err(AppError::Nvapi(NvapiError::DriverNotFound { .. }))
        ));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("NVIDIA GPU Stats Reader"));
        assert!(!text.contains("initialized"));
    }

    #[test]
    fn test_initialize_failure_releases_once() {
        let mock =
            MockNvapi::new(vec![reference_device()]).with_initialize_status(NvStatus::ERROR);
        let log = mock.call_log();

        let (result, text) = run(&Config::default(), mock);
        assert!(matches!(
            result,
            Err(AppError::Nvapi(NvapiError::InitializationFailed(_)))
        ));
        assert!(!text.contains("NVAPI initialized successfully."));

        let log = log.lock().unwrap();
        assert_eq!(log.unload_calls, 1);
        assert_eq!(log.releases, 1);
        assert_eq!(log.enumerate_calls, 0);
    }

    #[test]
    fn test_enumerate_failure_releases_once() {
        let mock = MockNvapi::new(vec![reference_device()])
            .with_enumerate_status(NvStatus::from_raw(-6));
        let log = mock.call_log();

        let (result, text) = run(&Config::default(), mock);
        assert!(matches!(
            result,
            Err(AppError::Nvapi(NvapiError::EnumerationFailed(_)))
        ));
        assert!(!text.contains("Found"));
        assert!(!text.contains("Done."));

        let log = log.lock().unwrap();
        assert_eq!(log.unload_calls, 1);
        assert_eq!(log.releases, 1);
        assert!(log.thermal_masks.is_empty());
    }

    #[test]
    fn test_per_device_failures_are_local() {
        let failing = MockDevice::new()
            .with_first_unsupported_bit(4)
            .with_voltage_status(NvStatus::NOT_SUPPORTED)
            .with_thermals_read_status(NvStatus::ERROR);
        let blank = MockDevice::new().with_voltage_uv(900_000);
        let mock = MockNvapi::new(vec![failing, blank]);

        let (result, text) = run(&Config::default(), mock);
        assert!(result.is_ok());

        assert!(text.contains("Thermals mask: 0x0000000f"));
        assert!(text.contains("Core Voltage: Not available"));
        assert!(text.contains("Hotspot Temperature: Error reading"));
        assert!(text.contains("Memory Temperature: Error reading"));
        assert!(text.contains("Thermals mask: 0xffffffff"));
        assert!(text.contains("Hotspot Temperature: Not available"));
        assert!(text.ends_with("Done.\n"));
    }

    #[test]
    fn test_missing_unload_does_not_fail_run() {
        let mock = MockNvapi::new(vec![reference_device()])
            .without_entry_point(crate::nvapi::QueryId::Unload);
        let log = mock.call_log();

        let (result, text) = run(&Config::default(), mock);
        assert!(result.is_ok());
        assert!(text.ends_with("Done.\n"));

        let log = log.lock().unwrap();
        assert_eq!(log.unload_calls, 0);
        assert_eq!(log.releases, 1);
    }

    #[test]
    fn test_no_gpus() {
        let (result, text) = run(&Config::default(), MockNvapi::new(vec![]));
        assert!(result.is_ok());
        assert!(text.ends_with("Found 0 NVIDIA GPU(s)\n\nDone.\n"));
    }

    #[test]
    fn test_gpu_selection() {
        let config = ConfigBuilder::new().with_gpu_index(Some(1)).build().unwrap();
        let mock = MockNvapi::new(vec![MockDevice::new(), reference_device()]);

        let (result, text) = run(&config, mock);
        assert!(result.is_ok());
        assert!(text.contains("Found 2 NVIDIA GPU(s)"));
        assert!(!text.contains("GPU 0:"));
        assert!(text.contains("GPU 1:\n"));
        assert!(text.contains("Thermals mask: 0x000001ff"));
    }

    #[test]
    fn test_gpu_selection_out_of_range() {
        let config = ConfigBuilder::new().with_gpu_index(Some(3)).build().unwrap();
        let mock = MockNvapi::new(vec![MockDevice::new()]);
        let log = mock.call_log();

        let (result, _) = run(&config, mock);
        assert!(matches!(
            result,
            Err(AppError::GpuNotFound { index: 3, count: 1 })
        ));
        assert_eq!(log.lock().unwrap().releases, 1);
    }

    #[test]
    fn test_json_output_has_no_banner() {
        let config = ConfigBuilder::new()
            .with_format(Some(OutputFormat::Json))
            .build()
            .unwrap();
        let mock = MockNvapi::new(vec![reference_device()]);

        let (result, text) = run(&config, mock);
        assert!(result.is_ok());

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["gpu_count"], 1);
        assert_eq!(value["gpus"][0]["thermals"]["memory"], 50);
    }

    #[test]
    fn test_compact_output() {
        let config = ConfigBuilder::new()
            .with_format(Some(OutputFormat::Compact))
            .build()
            .unwrap();
        let mock = MockNvapi::new(vec![reference_device(), reference_device()]);

        let (result, text) = run(&config, mock);
        assert!(result.is_ok());
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("GPU 0: mask=0x000001ff voltage=1.200V"));
    }
}
