//! Configuration constants.
//!
//! This module defines the constants used while assembling and executing
//! requests: delimiters, header names, defaults and network limits.

/// Separates a header name from its value (`"Name: value"`).
pub const HEADER_DELIMITER: char = ':';

/// Separates a cookie name from its value (`"name=value"`).
pub const COOKIE_DELIMITER: char = '=';

/// Separates several cookies supplied in one string (`"a=1; b=2"`).
pub const COOKIE_PAIR_SEPARATOR: char = ';';

/// Header name checked before injecting [`DEFAULT_CONTENT_TYPE`].
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Content type set when a body is supplied without an explicit `Content-Type`.
///
/// Some servers reject bodies that arrive without a content type. A more
/// accurate type can be supplied with `--header`.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Value of `--data-file` that reads the request body from standard input.
pub const STDIN_MARKER: &str = "-";

/// User-Agent sent when the caller did not supply one.
pub const DEFAULT_USER_AGENT: &str = concat!("conndebug/", env!("CARGO_PKG_VERSION"));

/// ALPN protocol advertised during the TLS handshake.
///
/// Only HTTP/1.1 is offered; the engine never speaks HTTP/2.
pub const ALPN_HTTP1: &[u8] = b"http/1.1";

/// Network name reported in connect trace events.
pub const TCP_NETWORK: &str = "tcp";

// Network operation timeouts
/// DNS query timeout in seconds (per name server attempt)
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// DNS attempts per query before giving up
pub const DNS_ATTEMPTS: usize = 2;
