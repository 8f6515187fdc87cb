//! Configuration types.
//!
//! This module defines the library-level configuration structs (no CLI
//! dependencies) and the logging enums shared with the CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// TLS trust and identity options.
///
/// `client_cert` and `client_key` must be supplied together; see
/// [`HttpOptions::check_preconditions`].
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Skip verification of the server's certificate chain and name.
    ///
    /// This turns off the primary defense against impersonation and exists
    /// only to inspect endpoints that would otherwise be rejected.
    pub insecure: bool,
    /// Name to present (SNI) and verify instead of the URL host
    pub server_name: Option<String>,
    /// PEM file of CA certificates that replaces the default trust store
    pub root_cert: Option<PathBuf>,
    /// PEM client certificate chain
    pub client_cert: Option<PathBuf>,
    /// PEM private key matching `client_cert`
    pub client_key: Option<PathBuf>,
}

/// What to print about a completed exchange and where the body goes.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Print the status line
    pub print_status: bool,
    /// Print the negotiated TLS state and peer certificates
    pub print_tls: bool,
    /// Use the short certificate summary when printing TLS state
    pub short_certs: bool,
    /// Print the response headers
    pub print_headers: bool,
    /// Write the body to this file instead of standard output
    pub output_file: Option<PathBuf>,
}

/// Library configuration for one `http` invocation.
///
/// Raw strings are kept as supplied; they are validated when a
/// [`RequestSpec`](crate::request::RequestSpec) is built from them.
///
/// # Examples
///
/// ```no_run
/// use conndebug::HttpOptions;
///
/// let options = HttpOptions {
///     url: "https://example.com".to_string(),
///     method: "post".to_string(),
///     headers: vec!["X-Test: 1".to_string()],
///     data: Some("hello".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Target URL (`http` or `https`)
    pub url: String,
    /// HTTP method, case-insensitive
    pub method: String,
    /// Raw `"Name: value"` header strings
    pub headers: Vec<String>,
    /// Raw `"name=value"` cookie strings
    pub cookies: Vec<String>,
    /// Request deadline; zero means unbounded
    pub timeout: Duration,
    /// Raw request body
    pub data: Option<String>,
    /// File to read the body from, or `-` for standard input
    pub data_file: Option<PathBuf>,
    /// TLS options
    pub tls: TlsOptions,
    /// Output options
    pub output: OutputOptions,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
            timeout: Duration::ZERO,
            data: None,
            data_file: None,
            tls: TlsOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

impl HttpOptions {
    /// Returns the timeout as an optional bound (`None` when unbounded).
    pub fn deadline(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}
