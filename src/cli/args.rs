//! CLI argument definitions using clap derive
//!
//! Running without arguments reads every GPU and prints the report.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

/// NVIDIA GPU stats reader
///
/// Reads core voltage, hotspot and memory temperature through NVAPI.
#[derive(Parser, Debug)]
#[command(name = "nvapi-stats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format [default: table]
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "NVAPI_STATS_CONFIG")]
    pub config: Option<String>,

    /// NVAPI library name or path
    #[arg(long, env = "NVAPI_STATS_LIBRARY")]
    pub library: Option<String>,

    /// Only report the GPU at this index (0-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..64))]
    pub gpu: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format per GPU
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
