//! `httptrace`: trace the phases of a GET request.

use anyhow::{Context, Result};

use super::build_executor;
use crate::config::TlsOptions;
use crate::request::RequestSpec;
use crate::trace::Tracer;
use crate::validation::parse_target_url;

/// Sends a bodiless GET to `url`, recording each connection phase on `tracer`.
///
/// Default TLS settings and no deadline are used. The response body is not
/// read. Events recorded before a failure stay in the tracer.
pub async fn run_httptrace(url: &str, tracer: &Tracer) -> Result<()> {
    let url = parse_target_url(url)?;
    let executor = build_executor(&TlsOptions::default())?;

    let result = executor
        .execute(&RequestSpec::get(url), Some(tracer))
        .await
        .context("error sending request")?;
    log::info!("Trace complete: {}", result.status_line());
    Ok(())
}
