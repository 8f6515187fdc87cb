//! Error handling.
//!
//! This module provides the error types for every stage of an invocation.
//! Errors are grouped by when they can occur:
//! - **Validation**: malformed input, reported before any I/O
//! - **Trust material**: TLS files that cannot be used, reported before the request
//! - **Fetch**: DNS, connect, handshake, timeout and body-read failures
//! - **Output**: failures writing the response body after a successful exchange

mod types;

// Re-export public API
pub use types::{FetchError, InitializationError, OutputError, TlsConfigError, ValidationError};
