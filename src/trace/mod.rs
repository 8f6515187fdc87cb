//! Connection lifecycle tracing.
//!
//! A [`Tracer`] is an append-only, timestamped log of connection phases. Each
//! recorded event is handed to the tracer's [`TraceSink`] right away, so a
//! partial timeline is visible even when the request later fails.

mod io;

use std::fmt;
use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use strum_macros::{Display as StrumDisplay, EnumIter};

pub(crate) use io::TracedIo;

/// Phase tag of a [`TraceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum TracePhase {
    /// Name resolution started
    DnsStart,
    /// Name resolution finished
    DnsDone,
    /// TCP connect attempt started
    ConnectStart,
    /// TCP connect attempt finished
    ConnectDone,
    /// TLS handshake started
    TlsStart,
    /// TLS handshake finished
    TlsDone,
    /// A connection is ready for the request
    GotConnection,
    /// First response byte read
    FirstByte,
}

/// What happened, with the details needed to describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    /// Resolution of `host` started.
    DnsStart {
        /// Host being resolved
        host: String,
    },
    /// Resolution of `host` finished.
    DnsDone {
        /// Host being resolved
        host: String,
        /// Resolved addresses, in the order they will be tried
        addrs: Vec<IpAddr>,
        /// Failure text when resolution failed
        error: Option<String>,
    },
    /// A connect attempt to `addr` started.
    ConnectStart {
        /// Network name
        network: &'static str,
        /// Address being dialed
        addr: SocketAddr,
    },
    /// A connect attempt to `addr` finished.
    ConnectDone {
        /// Network name
        network: &'static str,
        /// Address dialed
        addr: SocketAddr,
        /// Failure text when the attempt failed
        error: Option<String>,
    },
    /// The TLS handshake started.
    TlsStart,
    /// The TLS handshake finished.
    TlsDone {
        /// Negotiated protocol version
        version: Option<String>,
        /// Negotiated cipher suite
        cipher: Option<String>,
        /// Failure text when the handshake failed
        error: Option<String>,
    },
    /// A connection is ready.
    GotConnection {
        /// Always false: connections are never pooled
        reused: bool,
    },
    /// The first response byte arrived.
    FirstByte,
}

impl TraceKind {
    /// The phase this event belongs to.
    pub fn phase(&self) -> TracePhase {
        match self {
            TraceKind::DnsStart { .. } => TracePhase::DnsStart,
            TraceKind::DnsDone { .. } => TracePhase::DnsDone,
            TraceKind::ConnectStart { .. } => TracePhase::ConnectStart,
            TraceKind::ConnectDone { .. } => TracePhase::ConnectDone,
            TraceKind::TlsStart => TracePhase::TlsStart,
            TraceKind::TlsDone { .. } => TracePhase::TlsDone,
            TraceKind::GotConnection { .. } => TracePhase::GotConnection,
            TraceKind::FirstByte => TracePhase::FirstByte,
        }
    }

    /// Returns true for a `*-done` event that carries a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TraceKind::DnsDone { error: Some(_), .. }
                | TraceKind::ConnectDone { error: Some(_), .. }
                | TraceKind::TlsDone { error: Some(_), .. }
        )
    }
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unknown")
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceKind::DnsStart { host } => write!(f, "DNS start - host={host:?}"),
            TraceKind::DnsDone {
                host,
                error: Some(err),
                ..
            } => write!(f, "DNS failed - host={host:?}, err={err:?}"),
            TraceKind::DnsDone { addrs, .. } => {
                let addrs: Vec<String> = addrs.iter().map(IpAddr::to_string).collect();
                write!(f, "DNS done - addrs=[{}]", addrs.join(", "))
            }
            TraceKind::ConnectStart { network, addr } => {
                write!(
                    f,
                    "Connection starting - network={network:?}, addr=\"{addr}\""
                )
            }
            TraceKind::ConnectDone {
                network,
                addr,
                error: Some(err),
            } => write!(
                f,
                "Connection failed - network={network:?}, addr=\"{addr}\", err={err:?}"
            ),
            TraceKind::ConnectDone { network, addr, .. } => {
                write!(f, "Connection done - network={network:?}, addr=\"{addr}\"")
            }
            TraceKind::TlsStart => write!(f, "TLS handshake starting"),
            TraceKind::TlsDone {
                error: Some(err), ..
            } => write!(f, "TLS handshake failed - err={err:?}"),
            TraceKind::TlsDone {
                version, cipher, ..
            } => write!(
                f,
                "TLS handshake complete - version={}, cipher={}",
                or_unknown(version),
                or_unknown(cipher)
            ),
            TraceKind::GotConnection { reused } => write!(f, "Got connection - reused={reused}"),
            TraceKind::FirstByte => write!(f, "Got first response byte"),
        }
    }
}

/// One timestamped entry of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Time since the tracer was created
    pub elapsed: Duration,
    /// What happened
    pub kind: TraceKind,
}

impl TraceEvent {
    /// The phase of this event.
    pub fn phase(&self) -> TracePhase {
        self.kind.phase()
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}ms: {}", self.elapsed.as_millis(), self.kind)
    }
}

/// Receives each event as soon as it is recorded.
pub trait TraceSink: Send + Sync {
    /// Called once per event, in log order.
    fn on_event(&self, event: &TraceEvent);
}

/// Writes one line per event and flushes after each.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<std::io::Stdout> {
    /// A sink printing to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TraceSink for WriterSink<W> {
    fn on_event(&self, event: &TraceEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{event}").and_then(|()| writer.flush()) {
            log::warn!("Failed to write trace event: {e}");
        }
    }
}

struct TracerInner {
    start: Instant,
    events: Mutex<Vec<TraceEvent>>,
    sink: Option<Box<dyn TraceSink>>,
}

/// Append-only log of connection phases.
///
/// Cloning is cheap and clones share the same log, so events can be recorded
/// from any task.
#[derive(Clone)]
pub struct Tracer {
    inner: Arc<TracerInner>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("events", &self.events().len())
            .field("has_sink", &self.inner.sink.is_some())
            .finish()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// A tracer that only keeps the log.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A tracer that also notifies `sink` of every event.
    pub fn with_sink(sink: impl TraceSink + 'static) -> Self {
        Self::build(Some(Box::new(sink)))
    }

    fn build(sink: Option<Box<dyn TraceSink>>) -> Self {
        Self {
            inner: Arc::new(TracerInner {
                start: Instant::now(),
                events: Mutex::new(Vec::new()),
                sink,
            }),
        }
    }

    /// Timestamps `kind`, notifies the sink and appends the event.
    pub fn record(&self, kind: TraceKind) {
        let mut events = self
            .inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Timestamp under the lock so elapsed values never decrease in log order
        let event = TraceEvent {
            elapsed: self.inner.start.elapsed(),
            kind,
        };
        log::trace!("{event}");
        if let Some(sink) = &self.inner.sink {
            sink.on_event(&event);
        }
        events.push(event);
    }

    /// A snapshot of the log.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Phases of the log, in order.
    pub fn phases(&self) -> Vec<TracePhase> {
        self.events().iter().map(TraceEvent::phase).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn addr() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
    }

    #[test]
    fn test_messages() {
        let cases = [
            (
                TraceKind::DnsStart {
                    host: "example.com".to_string(),
                },
                "DNS start - host=\"example.com\"",
            ),
            (
                TraceKind::DnsDone {
                    host: "example.com".to_string(),
                    addrs: vec![IpAddr::from([1, 2, 3, 4]), IpAddr::from([5, 6, 7, 8])],
                    error: None,
                },
                "DNS done - addrs=[1.2.3.4, 5.6.7.8]",
            ),
            (
                TraceKind::DnsDone {
                    host: "nope.invalid".to_string(),
                    addrs: vec![],
                    error: Some("no record".to_string()),
                },
                "DNS failed - host=\"nope.invalid\", err=\"no record\"",
            ),
            (
                TraceKind::ConnectStart {
                    network: "tcp",
                    addr: addr(),
                },
                "Connection starting - network=\"tcp\", addr=\"127.0.0.1:8080\"",
            ),
            (
                TraceKind::ConnectDone {
                    network: "tcp",
                    addr: addr(),
                    error: None,
                },
                "Connection done - network=\"tcp\", addr=\"127.0.0.1:8080\"",
            ),
            (
                TraceKind::ConnectDone {
                    network: "tcp",
                    addr: addr(),
                    error: Some("refused".to_string()),
                },
                "Connection failed - network=\"tcp\", addr=\"127.0.0.1:8080\", err=\"refused\"",
            ),
            (TraceKind::TlsStart, "TLS handshake starting"),
            (
                TraceKind::TlsDone {
                    version: Some("TLS 1.3".to_string()),
                    cipher: Some("TLS13_AES_128_GCM_SHA256".to_string()),
                    error: None,
                },
                "TLS handshake complete - version=TLS 1.3, cipher=TLS13_AES_128_GCM_SHA256",
            ),
            (
                TraceKind::TlsDone {
                    version: None,
                    cipher: None,
                    error: Some("bad cert".to_string()),
                },
                "TLS handshake failed - err=\"bad cert\"",
            ),
            (
                TraceKind::GotConnection { reused: false },
                "Got connection - reused=false",
            ),
            (TraceKind::FirstByte, "Got first response byte"),
        ];
        for (kind, expected) in cases {
            assert_eq!(kind.to_string(), expected);
        }
    }

    #[test]
    fn test_event_line_format() {
        let event = TraceEvent {
            elapsed: Duration::from_millis(42),
            kind: TraceKind::FirstByte,
        };
        assert_eq!(event.to_string(), "    42ms: Got first response byte");
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(TracePhase::GotConnection.to_string(), "got-connection");
        assert_eq!(TracePhase::DnsStart.to_string(), "dns-start");
    }

    #[test]
    fn test_record_appends_in_order_with_monotonic_elapsed() {
        let tracer = Tracer::new();
        tracer.record(TraceKind::TlsStart);
        tracer.record(TraceKind::GotConnection { reused: false });
        tracer.record(TraceKind::FirstByte);

        assert_eq!(
            tracer.phases(),
            [
                TracePhase::TlsStart,
                TracePhase::GotConnection,
                TracePhase::FirstByte
            ]
        );
        let events = tracer.events();
        assert!(events.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    }

    #[test]
    fn test_sink_sees_events_immediately() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let tracer = Tracer::with_sink(WriterSink::new(SharedBuffer(Arc::clone(&buffer))));

        tracer.record(TraceKind::TlsStart);
        let written = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(written.ends_with("ms: TLS handshake starting\n"));
        assert_eq!(written.lines().count(), 1);
    }

    #[test]
    fn test_clones_share_the_log() {
        let tracer = Tracer::new();
        let clone = tracer.clone();
        std::thread::spawn(move || clone.record(TraceKind::FirstByte))
            .join()
            .unwrap();
        assert_eq!(tracer.events().len(), 1);
    }

    #[test]
    fn test_failure_detection() {
        assert!(TraceKind::ConnectDone {
            network: "tcp",
            addr: addr(),
            error: Some("refused".to_string())
        }
        .is_failure());
        assert!(!TraceKind::FirstByte.is_failure());
    }
}
