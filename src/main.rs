//! nvapi-stats - NVIDIA GPU sensor reader
//!
//! Prints core voltage, hotspot and memory temperature for each NVIDIA GPU.

use clap::Parser;
use nvapi_stats::cli::args::{generate_completions, Cli, Commands};
use nvapi_stats::commands::run_stats;
use nvapi_stats::config::ConfigBuilder;
use nvapi_stats::error::{AppError, NvapiError};
use nvapi_stats::nvapi::NvapiLibrary;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None);

    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }

    builder.init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())
        .and_then(|b| {
            b.with_verbose(cli.verbose)
                .with_format(cli.format)
                .with_library(cli.library)
                .with_gpu_index(cli.gpu)
                .build()
        });

    // Level comes from the merged config; init before propagating its error
    init_logging(cli.verbose || config.as_ref().is_ok_and(|c| c.general.verbose));
    let config = config?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_stats(
        &config,
        || NvapiLibrary::load_from(&config.driver.library),
        &mut out,
    )
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Nvapi(NvapiError::DriverNotFound { .. }) => {
            eprintln!();
            eprintln!("Hint: Make sure NVIDIA drivers are installed.");
            eprintln!("      libnvidia-api.so.1 ships with the proprietary driver.");
        }
        AppError::Nvapi(NvapiError::InitializationFailed(_)) => {
            eprintln!();
            eprintln!("Hint: Check that an NVIDIA GPU is present and the driver is loaded.");
        }
        AppError::GpuNotFound { .. } => {
            eprintln!();
            eprintln!("Hint: Run without --gpu to list every detected GPU.");
        }
        _ => {}
    }
}
