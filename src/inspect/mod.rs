//! Response inspection and output.
//!
//! Rendering functions write to any [`Write`] so the command layer decides
//! where diagnostics go. The body is copied verbatim, either to a writer or
//! atomically into a file.

mod body;

use std::io::{self, Write};

use http::HeaderMap;

use crate::fetch::{ExecutionResult, TlsState};
use crate::tls::{certificate_short_text, certificate_text};

pub use body::{copy_body, write_body, BodyTarget};

/// Line printed when the exchange was not encrypted.
pub const NO_TLS_STATE: &str =
    "No TLS connection state is available. The request was likely unencrypted (HTTP).";

/// Writes `"<code> <reason>"` and a newline.
pub fn render_status(result: &ExecutionResult, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", result.status_line())
}

/// Writes headers in wire form, `Name: value\r\n`, with title-cased names.
///
/// Values that are not valid UTF-8 are written byte for byte.
pub fn render_headers(headers: &HeaderMap, out: &mut impl Write) -> io::Result<()> {
    for (name, value) in headers {
        write!(out, "{}: ", title_case(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

/// Title-cases a header name, e.g. `content-type` → `Content-Type`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}

/// Writes the negotiated TLS state and each peer certificate.
///
/// `short` selects the certificate summary instead of the full text. A
/// certificate that does not decode is reported and the rest still render.
pub fn render_tls_state(
    state: Option<&TlsState>,
    short: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let Some(state) = state else {
        return writeln!(out, "{NO_TLS_STATE}");
    };

    writeln!(out, "TLS Version: {}", state.version)?;
    writeln!(out, "Cipher Suite: {}", state.cipher)?;
    writeln!(
        out,
        "Negotiated Protocol (ALPN): {}",
        state.alpn.as_deref().unwrap_or_default()
    )?;
    writeln!(out, "Server Name: {}", state.server_name)?;

    for (i, cert) in state.peer_certificates.iter().enumerate() {
        writeln!(out, "Peer Certificate #{i}:")?;
        let text = if short {
            certificate_short_text(cert.as_ref())
        } else {
            certificate_text(cert.as_ref())
        };
        match text {
            Ok(text) => writeln!(out, "{}", text.trim_end())?,
            Err(e) => writeln!(out, "Failed to parse certificate: {e}")?,
        }
    }
    Ok(())
}
