//! Error type definitions.
//!
//! Each stage of an invocation has its own error type so that callers can tell
//! input problems, trust-material problems, network problems and output
//! problems apart:
//!
//! - [`ValidationError`]: malformed input or conflicting flags (before any I/O)
//! - [`TlsConfigError`]: unreadable or unusable trust/identity material
//! - [`FetchError`]: failures during or after the request attempt
//! - [`OutputError`]: failures writing the response body
//! - [`InitializationError`]: logger/resolver setup

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Input-validation errors, reported before any network I/O.
///
/// Every variant names the offending input verbatim.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// `host:port` without a port.
    #[error("address {address}: missing port")]
    MissingPort {
        /// Input as supplied
        address: String,
    },

    /// `host:port` without a host.
    #[error("address {address}: missing host")]
    MissingHost {
        /// Input as supplied
        address: String,
    },

    /// Port that is not a number in `0..=65535`.
    #[error("address {address}: invalid port {port:?}")]
    InvalidPort {
        /// Input as supplied
        address: String,
        /// Port part of the input
        port: String,
    },

    /// Unbracketed address with more than one colon.
    #[error("address {address}: too many colons")]
    TooManyColons {
        /// Input as supplied
        address: String,
    },

    /// Bracketed host without a closing bracket.
    #[error("address {address}: missing ']'")]
    UnclosedBracket {
        /// Input as supplied
        address: String,
    },

    /// URL without a scheme.
    #[error("missing scheme (http/https) in url: {input}")]
    MissingScheme {
        /// Input as supplied
        input: String,
    },

    /// URL with a scheme other than `http`/`https`.
    #[error("unsupported scheme {scheme:?} (http/https) in url: {input}")]
    UnsupportedScheme {
        /// Scheme found in the input
        scheme: String,
        /// Input as supplied
        input: String,
    },

    /// URL that could not be parsed at all.
    #[error("failed to parse URL {input}")]
    InvalidUrl {
        /// Input as supplied
        input: String,
        /// Parser failure
        #[source]
        source: url::ParseError,
    },

    /// Method outside the allow-list.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Header string without the `:` delimiter.
    #[error("header {header:?} is malformed: missing {delimiter:?} delimiter")]
    MalformedHeader {
        /// Input as supplied
        header: String,
        /// Expected delimiter
        delimiter: char,
    },

    /// Header whose name or value cannot be sent over HTTP.
    #[error("header {header:?} is invalid: {reason}")]
    InvalidHeader {
        /// Input as supplied
        header: String,
        /// What is wrong with it
        reason: String,
    },

    /// Cookie string that could not be parsed.
    #[error("failed to parse cookie input {cookie:?}: {reason}")]
    MalformedCookie {
        /// Input as supplied
        cookie: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two flags that cannot be combined, or a pair supplied half-way.
    #[error("configuration conflict: {0}")]
    ConfigConflict(String),
}

/// Trust-material errors, reported before the request is attempted.
#[derive(Error, Debug)]
pub enum TlsConfigError {
    /// A PEM file could not be read.
    #[error("failed to read {kind} from {path:?}")]
    ReadMaterial {
        /// What the file was supposed to contain
        kind: &'static str,
        /// File path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: io::Error,
    },

    /// A root-CA file contained no usable certificate.
    #[error("no root certificates were parsed from {path:?}")]
    NoRootCertificates {
        /// File path
        path: PathBuf,
    },

    /// A PEM file was syntactically broken.
    #[error("malformed PEM data in {path:?}")]
    MalformedPem {
        /// File path
        path: PathBuf,
        /// Decoder failure
        #[source]
        source: io::Error,
    },

    /// The client certificate file contained no certificate.
    #[error("no client certificate found in {path:?}")]
    NoClientCertificate {
        /// File path
        path: PathBuf,
    },

    /// The client key file contained no private key.
    #[error("no private key found in {path:?}")]
    NoPrivateKey {
        /// File path
        path: PathBuf,
    },

    /// The certificate and key were rejected as a pair.
    #[error("invalid client certificate/key pair")]
    InvalidKeyPair(#[source] rustls::Error),

    /// The server-name override is neither a DNS name nor an IP address.
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    /// The TLS library rejected the configuration.
    #[error("TLS configuration error")]
    Rustls(#[source] rustls::Error),
}

/// Network/transport errors, reported during or after the attempt.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request body source could not be opened.
    #[error("error opening body {path:?}")]
    OpenBody {
        /// Body path (`-` for standard input)
        path: PathBuf,
        /// I/O failure
        #[source]
        source: io::Error,
    },

    /// The URL has no host to connect to.
    #[error("url has no host: {0}")]
    MissingHost(String),

    /// The host name could not be turned into a TLS server name.
    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),

    /// DNS resolution failed.
    #[error("error resolving host {host:?}")]
    Resolve {
        /// Host that was queried
        host: String,
        /// Resolver failure
        #[source]
        source: hickory_resolver::error::ResolveError,
    },

    /// DNS resolution returned no address.
    #[error("no addresses found for host {0:?}")]
    NoAddresses(String),

    /// Every TCP connect attempt failed; carries the last failure.
    #[error("error dialing address {addr}")]
    Connect {
        /// Last address attempted
        addr: SocketAddr,
        /// Connect failure
        #[source]
        source: io::Error,
    },

    /// The TLS handshake failed.
    #[error("TLS handshake with {server_name:?} failed")]
    TlsHandshake {
        /// Server name presented
        server_name: String,
        /// Handshake failure
        #[source]
        source: io::Error,
    },

    /// The request could not be assembled.
    #[error("error building request")]
    BuildRequest(#[source] http::Error),

    /// The HTTP/1.1 connection handshake failed.
    #[error("HTTP handshake failed")]
    HttpHandshake(#[source] hyper::Error),

    /// Writing the request or reading the response head failed.
    #[error("error sending request")]
    Send(#[source] hyper::Error),

    /// Reading the response body failed.
    #[error("error reading response body")]
    ReadBody(#[source] hyper::Error),

    /// The deadline expired.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Returns true when the failure is the request deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Output errors, reported after a logically successful exchange.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The destination file (or its temporary sibling) could not be created.
    #[error("failed to create output file {path:?}")]
    CreateFile {
        /// Destination path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: io::Error,
    },

    /// Writing body bytes failed.
    #[error("failed to write response body")]
    Write(#[source] io::Error),

    /// Moving the finished temporary file into place failed.
    #[error("failed to move output into {path:?}")]
    Persist {
        /// Destination path
        path: PathBuf,
        /// Rename failure
        #[source]
        source: io::Error,
    },
}
