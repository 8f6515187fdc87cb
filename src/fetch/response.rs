//! Results of a completed request.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode, Version};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use rustls::pki_types::CertificateDer;
use rustls::{ClientConnection, ProtocolVersion};
use tokio::task::JoinHandle;

use super::deadline::Deadline;
use crate::error_handling::FetchError;

/// TLS parameters negotiated for the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsState {
    /// Protocol version, e.g. `TLS 1.3`
    pub version: String,
    /// Cipher suite name
    pub cipher: String,
    /// Protocol agreed through ALPN
    pub alpn: Option<String>,
    /// Name presented for SNI and verification
    pub server_name: String,
    /// Certificates sent by the server, leaf first
    pub peer_certificates: Vec<CertificateDer<'static>>,
}

impl TlsState {
    pub(crate) fn capture(conn: &ClientConnection, server_name: &str) -> Self {
        let version = match conn.protocol_version() {
            Some(ProtocolVersion::TLSv1_2) => "TLS 1.2".to_string(),
            Some(ProtocolVersion::TLSv1_3) => "TLS 1.3".to_string(),
            Some(other) => format!("{other:?}"),
            None => "Unknown".to_string(),
        };
        let cipher = conn
            .negotiated_cipher_suite()
            .map(|cs| format!("{:?}", cs.suite()))
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            version,
            cipher,
            alpn: conn
                .alpn_protocol()
                .map(|proto| String::from_utf8_lossy(proto).into_owned()),
            server_name: server_name.to_string(),
            peer_certificates: conn
                .peer_certificates()
                .map(|certs| certs.to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Aborts the task driving the connection when dropped.
pub(crate) struct ConnectionGuard(JoinHandle<()>);

impl ConnectionGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A response whose head has arrived and whose body can still be read.
///
/// Dropping it closes the connection, whether or not the body was consumed.
pub struct ExecutionResult {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    tls: Option<TlsState>,
    body: Incoming,
    deadline: Deadline,
    _connection: ConnectionGuard,
}

impl std::fmt::Debug for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionResult")
            .field("status", &self.status)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

impl ExecutionResult {
    pub(crate) fn new(
        response: http::Response<Incoming>,
        tls: Option<TlsState>,
        deadline: Deadline,
        connection: ConnectionGuard,
    ) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            tls,
            body,
            deadline,
            _connection: connection,
        }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// `"<code> <reason>"`, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }

    /// HTTP version of the response.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Negotiated TLS state; `None` for plain HTTP.
    pub fn tls_state(&self) -> Option<&TlsState> {
        self.tls.as_ref()
    }

    /// Reads the next body chunk; `None` once the body is complete.
    ///
    /// Bounded by the same deadline as the rest of the request.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        let deadline = self.deadline;
        let body = &mut self.body;
        deadline
            .bound(async move {
                while let Some(frame) = body.frame().await {
                    let frame = frame.map_err(FetchError::ReadBody)?;
                    // Trailers are not part of the body
                    if let Ok(data) = frame.into_data() {
                        return Ok(Some(data));
                    }
                }
                Ok(None)
            })
            .await
    }

    /// Reads the whole remaining body.
    pub async fn bytes(mut self) -> Result<Bytes, FetchError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}
