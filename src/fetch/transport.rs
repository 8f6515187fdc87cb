//! Connection establishment: resolve, dial, TLS.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use hickory_resolver::TokioAsyncResolver;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use url::Host;

use super::response::TlsState;
use crate::config::TCP_NETWORK;
use crate::error_handling::FetchError;
use crate::tls::TlsSettings;
use crate::trace::{TraceKind, Tracer};

/// A connected stream, plain or TLS.
pub(crate) enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

fn note(tracer: Option<&Tracer>, kind: impl FnOnce() -> TraceKind) {
    if let Some(tracer) = tracer {
        tracer.record(kind());
    }
}

/// Resolves `host` to the addresses to dial, in order.
///
/// IP literals are returned as-is without a DNS phase.
pub(crate) async fn resolve(
    resolver: &TokioAsyncResolver,
    host: &Host<&str>,
    tracer: Option<&Tracer>,
) -> Result<Vec<IpAddr>, FetchError> {
    let domain = match host {
        Host::Ipv4(ip) => return Ok(vec![IpAddr::V4(*ip)]),
        Host::Ipv6(ip) => return Ok(vec![IpAddr::V6(*ip)]),
        Host::Domain(domain) => *domain,
    };

    note(tracer, || TraceKind::DnsStart {
        host: domain.to_string(),
    });
    log::debug!("Resolving {domain}");

    match resolver.lookup_ip(domain).await {
        Ok(lookup) => {
            let addrs: Vec<IpAddr> = lookup.iter().collect();
            if addrs.is_empty() {
                note(tracer, || TraceKind::DnsDone {
                    host: domain.to_string(),
                    addrs: Vec::new(),
                    error: Some("no addresses found".to_string()),
                });
                return Err(FetchError::NoAddresses(domain.to_string()));
            }
            note(tracer, || TraceKind::DnsDone {
                host: domain.to_string(),
                addrs: addrs.clone(),
                error: None,
            });
            log::debug!("Resolved {domain} to {addrs:?}");
            Ok(addrs)
        }
        Err(source) => {
            note(tracer, || TraceKind::DnsDone {
                host: domain.to_string(),
                addrs: Vec::new(),
                error: Some(source.to_string()),
            });
            Err(FetchError::Resolve {
                host: domain.to_string(),
                source,
            })
        }
    }
}

/// Dials each address in order and returns the first connection.
///
/// Fails with the last attempt's error when every address is refused.
pub(crate) async fn dial(
    addrs: &[IpAddr],
    port: u16,
    tracer: Option<&Tracer>,
) -> Result<TcpStream, FetchError> {
    let mut last_error = None;

    for ip in addrs {
        let addr = SocketAddr::new(*ip, port);
        note(tracer, || TraceKind::ConnectStart {
            network: TCP_NETWORK,
            addr,
        });
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                note(tracer, || TraceKind::ConnectDone {
                    network: TCP_NETWORK,
                    addr,
                    error: None,
                });
                if let Err(e) = stream.set_nodelay(true) {
                    log::debug!("Could not set TCP_NODELAY on {addr}: {e}");
                }
                log::debug!("Connected to {addr}");
                return Ok(stream);
            }
            Err(source) => {
                note(tracer, || TraceKind::ConnectDone {
                    network: TCP_NETWORK,
                    addr,
                    error: Some(source.to_string()),
                });
                log::debug!("Connect to {addr} failed: {source}");
                last_error = Some(FetchError::Connect { addr, source });
            }
        }
    }

    Err(last_error.unwrap_or_else(|| FetchError::NoAddresses(format!("port {port}"))))
}

/// Runs the TLS handshake over `stream` and captures the negotiated state.
pub(crate) async fn handshake(
    tls: &TlsSettings,
    host: &Host<&str>,
    stream: TcpStream,
    tracer: Option<&Tracer>,
) -> Result<(Transport, TlsState), FetchError> {
    let presented = tls.server_name_for(host)?;
    note(tracer, || TraceKind::TlsStart);
    log::debug!("Starting TLS handshake with server name {}", presented.display);

    match tls.connector().connect(presented.name.clone(), stream).await {
        Ok(stream) => {
            let state = TlsState::capture(stream.get_ref().1, &presented.display);
            note(tracer, || TraceKind::TlsDone {
                version: Some(state.version.clone()),
                cipher: Some(state.cipher.clone()),
                error: None,
            });
            log::debug!("TLS established: {} {}", state.version, state.cipher);
            Ok((Transport::Tls(Box::new(stream)), state))
        }
        Err(source) => {
            note(tracer, || TraceKind::TlsDone {
                version: None,
                cipher: None,
                error: Some(source.to_string()),
            });
            Err(FetchError::TlsHandshake {
                server_name: presented.display,
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TracePhase;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_ip_literal_skips_dns() {
        let resolver = crate::initialization::init_resolver().unwrap();
        let tracer = Tracer::new();
        let addrs = resolve(&resolver, &Host::Ipv4(Ipv4Addr::LOCALHOST), Some(&tracer))
            .await
            .unwrap();
        assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        assert!(tracer.events().is_empty());
    }

    #[tokio::test]
    async fn test_dial_records_each_attempt() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let tracer = Tracer::new();

        let stream = dial(&[IpAddr::V4(Ipv4Addr::LOCALHOST)], port, Some(&tracer)).await;
        assert!(stream.is_ok());
        assert_eq!(
            tracer.phases(),
            [TracePhase::ConnectStart, TracePhase::ConnectDone]
        );
        assert!(!tracer.events()[1].kind.is_failure());
    }

    #[tokio::test]
    async fn test_dial_falls_through_to_next_address() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let tracer = Tracer::new();

        // Nothing listens on 127.0.0.2, so the first attempt is refused
        let addrs = [
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
        ];
        assert!(dial(&addrs, port, Some(&tracer)).await.is_ok());

        let events = tracer.events();
        assert_eq!(events.len(), 4);
        assert!(events[1].kind.is_failure());
        assert!(!events[3].kind.is_failure());
    }

    #[tokio::test]
    async fn test_dial_refused_reports_last_address() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let tracer = Tracer::new();
        let err = dial(&[IpAddr::V4(Ipv4Addr::LOCALHOST)], port, Some(&tracer))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connect { .. }));
        assert!(err.to_string().contains("error dialing address"));
        assert!(tracer.events()[1].kind.is_failure());
    }
}
