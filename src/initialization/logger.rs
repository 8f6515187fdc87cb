//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors) and JSON formats. Logs are written to standard error so they
/// never mix with a response body written to standard output.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger was already installed.
///
/// # Examples
///
/// ```bash
/// # Show every stage of the request engine
/// conndebug --log-level debug http https://example.com
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=conndebug=debug,rustls=debug conndebug http https://example.com
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = env_logger::Builder::from_default_env();

    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);
    builder.filter_module("hyper", LevelFilter::Warn);
    builder.filter_module("hyper_util", LevelFilter::Warn);
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.filter_module("cookie_store", LevelFilter::Warn);
    // Truncated or malformed UDP answers are retried by hickory itself
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("conndebug", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() so tests that initialize twice get an error instead of a panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
