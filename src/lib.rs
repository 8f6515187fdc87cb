//! conndebug library: basic network connection debugging
//!
//! This library provides the engine behind the `conndebug` binary:
//! - TCP reachability checks
//! - Configurable HTTP(S) requests with custom headers, cookies, bodies and
//!   TLS trust/identity, with inspection of status, headers, TLS state and
//!   peer certificates
//! - A timestamped trace of every connection phase of a GET request
//!
//! # Example
//!
//! ```no_run
//! use conndebug::{run_http, HttpOptions, OutputOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let options = HttpOptions {
//!     url: "https://example.com".to_string(),
//!     headers: vec!["Accept: text/html".to_string()],
//!     output: OutputOptions {
//!         print_status: true,
//!         print_tls: true,
//!         short_certs: true,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! run_http(&options, &mut std::io::stderr()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod inspect;
pub mod request;
pub mod tls;
pub mod trace;
pub mod validation;

// Re-export public API
pub use commands::{run_http, run_httptrace, run_reachable};
pub use config::{HttpOptions, LogFormat, LogLevel, OutputOptions, TlsOptions};
pub use error_handling::{FetchError, OutputError, TlsConfigError, ValidationError};
pub use fetch::{ExecutionResult, Executor, TlsState};
pub use request::{HttpMethod, RequestSpec};
pub use trace::{TraceEvent, TraceKind, TracePhase, TraceSink, Tracer, WriterSink};
