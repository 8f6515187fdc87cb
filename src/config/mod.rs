//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (delimiters, defaults, timeouts)
//! - Library configuration structs
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{parse_timeout, Cli, Command, HttpArgs};
pub use constants::*;
pub use types::{HttpOptions, LogFormat, LogLevel, OutputOptions, TlsOptions};
