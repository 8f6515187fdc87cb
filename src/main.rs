//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `conndebug` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use conndebug::config::{Cli, Command};
use conndebug::initialization::{init_crypto_provider, init_logger_with};
use conndebug::{run_http, run_httptrace, run_reachable, HttpOptions, Tracer, WriterSink};

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Reachable { address } => run_reachable(&address, &mut std::io::stdout()).await,
        Command::Http(args) => {
            let options = HttpOptions::from(args);
            run_http(&options, &mut std::io::stderr()).await
        }
        Command::Httptrace { url } => {
            let tracer = Tracer::with_sink(WriterSink::stdout());
            run_httptrace(&url, &tracer).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger_with(cli.log_level.into(), cli.log_format)
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    if let Err(e) = dispatch(cli.command).await {
        eprintln!("conndebug error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
