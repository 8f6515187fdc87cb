//! Command-line interface definition.
//!
//! The clap types here only describe flags; they are converted into the
//! library configuration structs in [`crate::config::types`] before use.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::types::{HttpOptions, LogFormat, LogLevel, OutputOptions, TlsOptions};

/// A small CLI for basic network connection debugging.
#[derive(Debug, Parser)]
#[command(name = "conndebug", version, about)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test if an address is reachable over TCP
    Reachable {
        /// Address to dial (`host:port`)
        #[arg(value_name = "ip:port")]
        address: String,
    },
    /// Send an HTTP request
    Http(HttpArgs),
    /// Trace an HTTP GET request
    Httptrace {
        /// URL to request
        url: String,
    },
}

/// Flags of the `http` subcommand.
#[derive(Debug, Args)]
pub struct HttpArgs {
    /// URL to request
    pub url: String,

    /// The HTTP method to send the request with
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// The header(s) to add to the request (format: 'Header: value')
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// The cookie(s) to add to the request (format: 'key=value')
    #[arg(short = 'c', long = "cookie")]
    pub cookies: Vec<String>,

    /// The max amount of time the request can take. A value of 0 means no timeout.
    #[arg(short, long, default_value = "0", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Raw data that should be sent in the body of the request
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// The path to a file (or '-' for stdin) to use as the request body
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Skip TLS server verification
    #[arg(long)]
    pub insecure: bool,

    /// Override the server name used to verify the server's certificate
    #[arg(long)]
    pub server_name: Option<String>,

    /// Path to a PEM-encoded CA root certificate to trust
    #[arg(long, value_name = "PATH")]
    pub root_cert: Option<PathBuf>,

    /// Path to a PEM-encoded client certificate to use
    #[arg(long, value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// Path to a PEM-encoded private key to use
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Print out the response status
    #[arg(long)]
    pub print_status: bool,

    /// Print out the response TLS information
    #[arg(long = "print-tls")]
    pub print_tls: bool,

    /// When printing TLS info, print the short representation of the certificates
    #[arg(long)]
    pub short_certs: bool,

    /// Print out the response headers
    #[arg(long)]
    pub print_headers: bool,

    /// A file path to output the response body to
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl From<HttpArgs> for HttpOptions {
    fn from(args: HttpArgs) -> Self {
        Self {
            url: args.url,
            method: args.method,
            headers: args.headers,
            cookies: args.cookies,
            timeout: args.timeout,
            data: args.data,
            data_file: args.data_file,
            tls: TlsOptions {
                insecure: args.insecure,
                server_name: args.server_name,
                root_cert: args.root_cert,
                client_cert: args.cert,
                client_key: args.key,
            },
            output: OutputOptions {
                print_status: args.print_status,
                print_tls: args.print_tls,
                short_certs: args.short_certs,
                print_headers: args.print_headers,
                output_file: args.output,
            },
        }
    }
}

/// Parses a timeout such as `500ms`, `10s` or `1m30s`; a bare `0` disables the timeout.
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(trimmed).map_err(|e| format!("invalid duration {raw:?}: {e}"))
}
