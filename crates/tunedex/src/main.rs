//! Tunedex - browse a music library index from the command line.
//!
//! This is the main entry point of the command-line tool.

mod commands;
mod logging;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use commands::{AppState, Cli, CliResult};
use logging::LoggingConfig;
use tracing::{Level, error, info};
use tunedex_core::IndexConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::auto();
    if cli.verbose {
        log_config = log_config.with_console_level(Level::DEBUG);
    }
    let _guard = match logging::init(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: file logging disabled: {e}");
            None
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = IndexConfig::load()?;
    info!("Starting tunedex with data directory {}", config.data_directory.display());

    let state = AppState::open(&cli.library, &config)?;
    info!("Library ready: {} tracks", state.library().tracks().len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    state.execute(&cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}
