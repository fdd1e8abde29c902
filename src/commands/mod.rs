//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod stats;

pub use stats::run_stats;
