//! Subcommand implementations.
//!
//! Each command validates its input, runs, and wraps stage failures with a
//! short context so the binary can print the whole chain.

mod http;
mod httptrace;
mod reachable;

use anyhow::{Context, Result};

use crate::config::TlsOptions;
use crate::fetch::Executor;
use crate::initialization::init_resolver;
use crate::tls::build_tls_settings;

pub use http::run_http;
pub use httptrace::run_httptrace;
pub use reachable::run_reachable;

/// Builds an executor from TLS options and the system resolver configuration.
pub fn build_executor(tls: &TlsOptions) -> Result<Executor> {
    let settings = build_tls_settings(tls).context("error building client")?;
    let resolver = init_resolver().context("error building client")?;
    Ok(Executor::new(resolver, settings))
}
