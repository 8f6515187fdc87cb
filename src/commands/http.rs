//! `http`: send one configurable request.

use std::io::Write;

use anyhow::{Context, Result};

use super::build_executor;
use crate::config::HttpOptions;
use crate::inspect::{render_headers, render_status, render_tls_state, write_body, BodyTarget};
use crate::request::RequestSpec;

/// Sends the request described by `options` and reports on the response.
///
/// TLS state, status and headers are written to `diag` in that order, each
/// only when requested. The body then goes to standard output or the output
/// file.
///
/// # Errors
///
/// Fails on invalid input, unusable trust material, any network failure or
/// timeout, and output failures.
pub async fn run_http(options: &HttpOptions, diag: &mut impl Write) -> Result<()> {
    let spec = RequestSpec::from_options(options)?;
    let executor = build_executor(&options.tls)?;

    let mut result = executor
        .execute(&spec, None)
        .await
        .context("error sending request")?;

    let output = &options.output;
    if output.print_tls {
        render_tls_state(result.tls_state(), output.short_certs, diag)
            .context("failed to write TLS state")?;
    }
    if output.print_status {
        render_status(&result, diag).context("failed to write response status")?;
    }
    if output.print_headers {
        render_headers(result.headers(), diag).context("failed to write response headers")?;
    }
    diag.flush()?;

    let target = BodyTarget::from_path(output.output_file.as_deref());
    let written = write_body(&mut result, &target)
        .await
        .context("failed to write response body")?;
    log::debug!("Response body complete ({written} byte(s))");

    Ok(())
}
