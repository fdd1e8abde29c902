//! Output formatting utilities
//!
//! Provides table, compact and JSON output formatting for the stats report.

use crate::cli::args::OutputFormat;
use crate::domain::{GpuStats, Temperature};
use serde::Serialize;
use std::io::{self, Write};

const BANNER_RULE: &str = "=================================================";
const SECTION_RULE: &str = "-------------------------------------------------";

/// Format and write output based on the selected format
pub fn write_output<W, T>(out: &mut W, data: &T, format: OutputFormat) -> io::Result<()>
where
    W: Write,
    T: Serialize + TableDisplay,
{
    match format {
        OutputFormat::Table => {
            writeln!(out, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(out, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as compact lines
    fn to_compact(&self) -> String;
}

/// Banner printed before the driver is loaded
pub fn banner(library: &str) -> String {
    format!(
        "{rule}\nNVIDIA GPU Stats Reader\nUsing undocumented NVAPI calls from {library}\n{rule}\n",
        rule = BANNER_RULE,
        library = library
    )
}

fn temperature_line(label: &str, temp: Option<Temperature>) -> String {
    match temp {
        Some(t) => format!("{}: {}\n", label, t),
        None => format!("{}: Not available\n", label),
    }
}

fn compact_value<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

impl TableDisplay for GpuStats {
    fn to_table(&self) -> String {
        let mut output = format!(
            "{rule}\nGPU {}:\n{rule}\nThermals mask: {}\n",
            self.index,
            self.thermal_mask,
            rule = SECTION_RULE
        );

        if let Some(bus_id) = self.bus_id {
            output.push_str(&format!("Bus ID: {}\n", bus_id));
        }
        output.push('\n');

        match self.voltage {
            Some(v) => output.push_str(&format!("Core Voltage: {}\n", v)),
            None => output.push_str("Core Voltage: Not available\n"),
        }

        match self.thermals {
            Some(t) => {
                output.push_str(&temperature_line("Hotspot Temperature", t.hotspot));
                output.push_str(&temperature_line("Memory Temperature", t.memory));
            }
            None => {
                output.push_str("Hotspot Temperature: Error reading\n");
                output.push_str("Memory Temperature: Error reading\n");
            }
        }

        output
    }

    fn to_compact(&self) -> String {
        let (hotspot, memory) = match self.thermals {
            Some(t) => (compact_value(t.hotspot), compact_value(t.memory)),
            None => ("error".to_string(), "error".to_string()),
        };

        format!(
            "GPU {}: mask={} voltage={} hotspot={} memory={}",
            self.index,
            self.thermal_mask,
            compact_value(self.voltage.map(|v| format!("{:.3}V", v.as_volts()))),
            hotspot,
            memory
        )
    }
}

/// Report for one run
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Number of GPUs the driver enumerated
    pub gpu_count: usize,
    /// Reports for the selected GPUs
    pub gpus: Vec<GpuStats>,
}

impl TableDisplay for StatsReport {
    fn to_table(&self) -> String {
        let mut output = format!("Found {} NVIDIA GPU(s)\n", self.gpu_count);

        for gpu in &self.gpus {
            output.push('\n');
            output.push_str(&gpu.to_table());
        }

        output
    }

    fn to_compact(&self) -> String {
        self.gpus
            .iter()
            .map(|g| g.to_compact())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
