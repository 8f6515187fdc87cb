//! Request execution.
//!
//! The [`Executor`] sends exactly one request per call. Each phase runs
//! explicitly so it can be observed by a [`Tracer`]:
//! - DNS resolution (skipped for IP-literal hosts)
//! - TCP connect to each resolved address in order
//! - TLS handshake for `https`
//! - HTTP/1.1 handshake, request write and response head read
//!
//! One deadline bounds every phase and the later body reads.

mod deadline;
mod response;
mod transport;

use std::fmt;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use http::header::{COOKIE, HOST, USER_AGENT};
use http::{HeaderValue, Request};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use url::Position;

use crate::config::DEFAULT_USER_AGENT;
use crate::error_handling::FetchError;
use crate::request::{RequestBody, RequestSpec};
use crate::tls::TlsSettings;
use crate::trace::{TraceKind, TracedIo, Tracer};

use deadline::Deadline;
use response::ConnectionGuard;
use transport::Transport;

pub use response::{ExecutionResult, TlsState};

/// Sends validated requests over fresh connections.
#[derive(Clone)]
pub struct Executor {
    resolver: Arc<TokioAsyncResolver>,
    tls: TlsSettings,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Creates an executor using `resolver` for DNS and `tls` for `https` URLs.
    pub fn new(resolver: Arc<TokioAsyncResolver>, tls: TlsSettings) -> Self {
        Self { resolver, tls }
    }

    /// Sends `spec` once and returns as soon as the response head arrives.
    ///
    /// With a tracer, every phase is recorded as it happens. The tracer only
    /// observes: the same request is sent and the same errors are returned
    /// without one.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the first phase that fails, or
    /// [`FetchError::Timeout`] once the deadline passes.
    pub async fn execute(
        &self,
        spec: &RequestSpec,
        tracer: Option<&Tracer>,
    ) -> Result<ExecutionResult, FetchError> {
        let deadline = Deadline::start(spec.timeout);
        deadline.bound(self.send(spec, tracer, deadline)).await
    }

    async fn send(
        &self,
        spec: &RequestSpec,
        tracer: Option<&Tracer>,
        deadline: Deadline,
    ) -> Result<ExecutionResult, FetchError> {
        let body = spec.body.open().await?;

        let host = spec
            .url
            .host()
            .ok_or_else(|| FetchError::MissingHost(spec.url.to_string()))?;
        let port = spec
            .url
            .port_or_known_default()
            .ok_or_else(|| FetchError::MissingHost(spec.url.to_string()))?;

        let addrs = transport::resolve(&self.resolver, &host, tracer).await?;
        let stream = transport::dial(&addrs, port, tracer).await?;

        let (conn, tls_state) = if spec.url.scheme() == "https" {
            let (conn, state) = transport::handshake(&self.tls, &host, stream, tracer).await?;
            (conn, Some(state))
        } else {
            (Transport::Plain(stream), None)
        };

        if let Some(tracer) = tracer {
            tracer.record(TraceKind::GotConnection { reused: false });
        }

        let io = TokioIo::new(TracedIo::new(conn, tracer.cloned()));
        let (mut sender, connection) = http1::Builder::new()
            .title_case_headers(true)
            .handshake::<_, RequestBody>(io)
            .await
            .map_err(FetchError::HttpHandshake)?;

        let guard = ConnectionGuard::new(tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::debug!("Connection closed with error: {e}");
            }
        }));

        let request = build_request(spec, body)?;
        log::info!("Sending {} {}", spec.method, spec.url);
        let response = sender
            .send_request(request)
            .await
            .map_err(FetchError::Send)?;
        log::info!("Received {} from {}", response.status(), spec.url);

        Ok(ExecutionResult::new(response, tls_state, deadline, guard))
    }
}

/// Assembles the wire request.
///
/// `Host` and `User-Agent` are added unless already supplied, and the cookie
/// jar's header is merged into any supplied `Cookie` header.
fn build_request(
    spec: &RequestSpec,
    body: RequestBody,
) -> Result<Request<RequestBody>, FetchError> {
    let mut request = Request::builder()
        .method(spec.method.as_http())
        .uri(&spec.url[Position::BeforePath..Position::AfterQuery])
        .body(body)
        .map_err(FetchError::BuildRequest)?;

    let headers = request.headers_mut();
    *headers = spec.headers.to_header_map();

    if !headers.contains_key(HOST) {
        let host = spec
            .url
            .host_str()
            .ok_or_else(|| FetchError::MissingHost(spec.url.to_string()))?;
        let authority = match spec.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let value = HeaderValue::from_str(&authority)
            .map_err(|e| FetchError::BuildRequest(e.into()))?;
        headers.insert(HOST, value);
    }

    if !headers.contains_key(USER_AGENT) {
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    }

    if let Some(jar_cookies) = spec.cookies.header_for(&spec.url) {
        let merged = match headers.get(COOKIE) {
            Some(existing) => {
                let mut combined = existing.as_bytes().to_vec();
                combined.extend_from_slice(b"; ");
                combined.extend_from_slice(jar_cookies.as_bytes());
                HeaderValue::from_bytes(&combined)
                    .map_err(|e| FetchError::BuildRequest(e.into()))?
            }
            None => jar_cookies,
        };
        headers.insert(COOKIE, merged);
    }

    Ok(request)
}
