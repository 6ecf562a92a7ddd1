//! Shared test utilities: scripted mock transport and a recording subscriber.
//!
//! `MockTransport` replays a script of connect outcomes and records when each
//! attempt happened, which is what the reconnection timing tests assert
//! against under a paused clock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::dispatch::{Signal, Subscriber};
use crate::transport::{Connection, FrameReader, FrameWriter, Transport, TransportError};

/// One scripted outcome for a `connect` call.
pub enum ConnectOutcome {
    /// Attempt fails.
    Fail,
    /// Attempt succeeds with this connection.
    Succeed(Connection),
}

/// Transport that replays scripted connect outcomes.
///
/// An exhausted script fails every further attempt, which is the common case
/// for backoff tests.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<ConnectOutcome>>,
    connect_times: Mutex<Vec<tokio::time::Instant>>,
    urls: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Empty script: every connect attempt fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the script.
    pub fn push(&self, outcome: ConnectOutcome) {
        self.script.lock().push_back(outcome);
    }

    /// Number of connect attempts observed so far.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connect_times.lock().len()
    }

    /// Timestamps of every connect attempt, in order.
    #[must_use]
    pub fn connect_times(&self) -> Vec<tokio::time::Instant> {
        self.connect_times.lock().clone()
    }

    /// URLs dialed, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        self.connect_times.lock().push(tokio::time::Instant::now());
        self.urls.lock().push(url.to_owned());
        match self.script.lock().pop_front() {
            Some(ConnectOutcome::Succeed(conn)) => Ok(conn),
            Some(ConnectOutcome::Fail) | None => {
                Err(TransportError::Connect("scripted failure".into()))
            }
        }
    }
}

/// Remote end of a mock connection: push frames, observe sends, close.
pub struct MockRemote {
    inbound: mpsc::UnboundedSender<Result<String, TransportError>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockRemote {
    /// Push one inbound text frame to the client.
    pub fn push_frame(&self, text: impl Into<String>) {
        let _ = self.inbound.send(Ok(text.into()));
    }

    /// Surface a mid-stream transport error to the client.
    pub fn push_error(&self, message: impl Into<String>) {
        let _ = self.inbound.send(Err(TransportError::Io(message.into())));
    }

    /// Frames the client wrote, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Whether the client closed its writer half.
    #[must_use]
    pub fn client_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Build a mock connection plus its remote-control handle.
///
/// Dropping the `MockRemote` closes the inbound stream, which the client
/// observes as the peer closing the connection.
#[must_use]
pub fn mock_connection() -> (Connection, MockRemote) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));
    let conn = Connection {
        reader: Box::new(MockReader { inbound: rx }),
        writer: Box::new(MockWriter {
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        }),
    };
    let remote = MockRemote {
        inbound: tx,
        sent,
        closed,
    };
    (conn, remote)
}

struct MockReader {
    inbound: mpsc::UnboundedReceiver<Result<String, TransportError>>,
}

#[async_trait]
impl FrameReader for MockReader {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.inbound.recv().await
    }
}

struct MockWriter {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameWriter for MockWriter {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Io("writer closed".into()));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Subscriber that records every delivered signal and when it arrived.
#[derive(Default)]
pub struct Recorder {
    signals: Mutex<Vec<(tokio::time::Instant, Signal)>>,
}

impl Recorder {
    /// Fresh recorder behind an `Arc`, ready to subscribe.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Signals seen so far, in delivery order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().iter().map(|(_, s)| s.clone()).collect()
    }

    /// Delivery timestamps, in order. Meaningful under a paused clock.
    #[must_use]
    pub fn timestamps(&self) -> Vec<tokio::time::Instant> {
        self.signals.lock().iter().map(|(t, _)| *t).collect()
    }

    /// Number of signals seen so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.signals.lock().len()
    }
}

impl Subscriber for Recorder {
    fn deliver(&self, signal: &Signal) -> anyhow::Result<()> {
        self.signals
            .lock()
            .push((tokio::time::Instant::now(), signal.clone()));
        Ok(())
    }
}
