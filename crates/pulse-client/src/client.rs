//! Connection lifecycle: state machine, receive loop, reconnection backoff.
//!
//! One [`IngestClient`] owns one logical connection to the collector. Frames
//! are processed strictly in arrival order — each frame is classified,
//! decoded, and dispatched before the next is read. The backoff sleep
//! between reconnection attempts is the only suspension point, and it is
//! cancellable so an explicit `disconnect` can never race a stale reconnect.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use parking_lot::Mutex;
use pulse_core::{DecodeError, ServerFrame};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::dispatch::{BatchSummary, Dispatcher, Signal, Topic};
use crate::metrics::{
    INGEST_BATCHES_DECODED_TOTAL, INGEST_BATCH_ERRORS_TOTAL, INGEST_CONNECTS_TOTAL,
    INGEST_EVENTS_TOTAL, INGEST_FRAMES_TOTAL, INGEST_PROTOCOL_ERRORS_TOTAL,
    INGEST_RECONNECT_ATTEMPTS_TOTAL, INGEST_SENDS_DROPPED_TOTAL, INGEST_TRANSPORT_ERRORS_TOTAL,
};
use crate::transport::{Connection, Transport, WsTransport};

/// Lifecycle of the managed connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected.
    Idle,
    /// Dialing the ingest endpoint.
    Connecting,
    /// Established; frames are flowing.
    Open,
    /// Explicit shutdown in progress.
    Closing,
    /// Not connected. Terminal until an explicit `connect`.
    Closed,
    /// Unexpectedly closed; a retry is scheduled.
    Reconnecting,
}

/// Streaming ingest client.
///
/// Explicitly constructed and explicitly owned — inject it into consumers
/// rather than reaching for ambient global state. Cloning hands out another
/// handle to the same connection.
#[derive(Clone)]
pub struct IngestClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: IngestConfig,
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    state: Mutex<ConnectionState>,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    cancel: Mutex<Option<CancellationToken>>,
    /// Connection generation. Bumped by `connect` and `disconnect` so a
    /// superseded run loop can no longer touch the shared state.
    generation: AtomicU64,
}

impl IngestClient {
    /// Client over the production WebSocket transport.
    #[must_use]
    pub fn new(config: IngestConfig) -> Self {
        Self::with_transport(config, Arc::new(WsTransport))
    }

    /// Client over a caller-supplied transport (tests inject mocks here).
    #[must_use]
    pub fn with_transport(config: IngestConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                dispatcher: Dispatcher::new(),
                state: Mutex::new(ConnectionState::Idle),
                outbound: Mutex::new(None),
                cancel: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The topic registry consumers subscribe through.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Open the connection with `token` attached as the query credential.
    ///
    /// Idempotent while a connection is open or being established. Must be
    /// called from within a tokio runtime; the receive loop runs on a
    /// spawned task.
    pub fn connect(&self, token: &str) {
        {
            let state = self.inner.state.lock();
            if matches!(
                *state,
                ConnectionState::Open | ConnectionState::Connecting | ConnectionState::Reconnecting
            ) {
                debug!(state = ?*state, "connect ignored");
                return;
            }
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        if let Some(old) = self.inner.cancel.lock().replace(cancel.clone()) {
            old.cancel();
        }
        *self.inner.state.lock() = ConnectionState::Connecting;

        let inner = Arc::clone(&self.inner);
        let token = token.to_owned();
        let _ = tokio::spawn(async move {
            inner.run(generation, &token, cancel).await;
        });
    }

    /// Send a payload to the collector. Best-effort: silently dropped when
    /// the connection is not open, never queued across reconnects.
    pub fn send<T: Serialize>(&self, payload: &T) {
        if *self.inner.state.lock() != ConnectionState::Open {
            counter!(INGEST_SENDS_DROPPED_TOTAL).increment(1);
            debug!("send while not open; payload dropped");
            return;
        }
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(error) => {
                warn!(error = %error, "failed to serialize outbound payload");
                return;
            }
        };
        if let Some(tx) = self.inner.outbound.lock().as_ref() {
            let _ = tx.send(json);
        }
    }

    /// Close the connection. Terminal: cancels any pending reconnection
    /// timer, so resuming requires an explicit [`IngestClient::connect`].
    pub fn disconnect(&self) {
        {
            let mut state = self.inner.state.lock();
            if matches!(*state, ConnectionState::Idle) {
                return;
            }
            *state = ConnectionState::Closing;
        }
        // Supersede the run loop before cancelling it: its own state writes
        // become no-ops and the disconnect owns the final transition.
        let _ = self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = self.inner.cancel.lock().take() {
            cancel.cancel();
        }
        *self.inner.outbound.lock() = None;
        *self.inner.state.lock() = ConnectionState::Closed;
        info!("ingest connection closed by user");
    }
}

impl Inner {
    fn set_state(&self, generation: u64, next: ConnectionState) {
        if self.generation.load(Ordering::SeqCst) == generation {
            *self.state.lock() = next;
        }
    }

    /// Connection loop: dial, pump frames, and on failure or close walk the
    /// backoff schedule until the attempt budget runs out or the generation
    /// is cancelled.
    async fn run(self: Arc<Self>, generation: u64, token: &str, cancel: CancellationToken) {
        let url = format!("{}?token={}", self.config.ingest_url, token);
        let mut attempts: u32 = 0;

        loop {
            match self.transport.connect(&url).await {
                Ok(conn) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let (tx, rx) = mpsc::unbounded_channel();
                    *self.outbound.lock() = Some(tx);
                    self.set_state(generation, ConnectionState::Open);
                    attempts = 0;
                    counter!(INGEST_CONNECTS_TOTAL).increment(1);
                    info!(url = %self.config.ingest_url, "ingest connection open");
                    self.dispatcher.publish(Topic::Connected, &Signal::Connected);

                    self.pump(conn, rx, &cancel).await;

                    *self.outbound.lock() = None;
                    self.set_state(generation, ConnectionState::Closed);
                    self.dispatcher
                        .publish(Topic::Disconnected, &Signal::Disconnected);
                    if cancel.is_cancelled() {
                        debug!("closed by disconnect; reconnection suppressed");
                        return;
                    }
                }
                Err(error) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    warn!(error = %error, attempt = attempts, "connect attempt failed");
                }
            }

            // Reconnection policy: delay = base * 2^n, n failures so far.
            if attempts >= self.config.reconnect.max_attempts {
                warn!(attempts, "reconnect attempts exhausted; staying disconnected");
                self.set_state(generation, ConnectionState::Closed);
                return;
            }
            let delay = self.config.reconnect.delay_for(attempts);
            attempts += 1;
            self.set_state(generation, ConnectionState::Reconnecting);
            counter!(INGEST_RECONNECT_ATTEMPTS_TOTAL).increment(1);
            debug!(
                delay_ms = delay.as_millis() as u64,
                attempt = attempts,
                "reconnect scheduled"
            );
            tokio::select! {
                () = cancel.cancelled() => {
                    self.set_state(generation, ConnectionState::Closed);
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Drive one established connection until the peer closes it or the
    /// generation is cancelled.
    async fn pump(
        &self,
        conn: Connection,
        mut outbound: mpsc::UnboundedReceiver<String>,
        cancel: &CancellationToken,
    ) {
        let Connection {
            mut reader,
            mut writer,
        } = conn;

        // Writer task: drains the outbound queue so a blocked send can never
        // stall frame processing. Child token so an explicit disconnect also
        // closes the socket politely.
        let writer_stop = cancel.child_token();
        let stop = writer_stop.clone();
        let writer_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = stop.cancelled() => {
                        writer.close().await;
                        return;
                    }
                    outgoing = outbound.recv() => match outgoing {
                        Some(text) => {
                            if let Err(error) = writer.send(text).await {
                                warn!(error = %error, "outbound send failed");
                            }
                        }
                        // The sender is dropped alongside cancellation on
                        // disconnect; either exit path must close the socket.
                        None => {
                            writer.close().await;
                            return;
                        }
                    }
                }
            }
        });

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                inbound = reader.recv() => match inbound {
                    Some(Ok(text)) => self.handle_frame(&text),
                    Some(Err(error)) => {
                        // Non-terminal: the transport may still close
                        // normally afterward. Reconnection is driven by the
                        // close, never by this signal.
                        counter!(INGEST_TRANSPORT_ERRORS_TOTAL).increment(1);
                        warn!(error = %error, "transport error");
                        self.dispatcher
                            .publish(Topic::Error, &Signal::Error(error.to_string()));
                    }
                    None => {
                        debug!("connection closed by peer");
                        break;
                    }
                }
            }
        }

        writer_stop.cancel();
        let _ = writer_task.await;
    }

    /// Classify and dispatch one inbound frame. Never fails the loop: a
    /// corrupt frame or batch is logged, counted, and dropped.
    fn handle_frame(&self, text: &str) {
        counter!(INGEST_FRAMES_TOTAL).increment(1);
        match ServerFrame::parse(text) {
            Ok(ServerFrame::Event(event)) => {
                counter!(INGEST_EVENTS_TOTAL).increment(1);
                self.dispatcher.publish(Topic::Event, &Signal::Event(event));
            }
            Ok(ServerFrame::Batch(batch)) => match pulse_codec::decode(&batch) {
                Ok(events) => {
                    counter!(INGEST_BATCHES_DECODED_TOTAL).increment(1);
                    self.dispatcher.publish(
                        Topic::Batch,
                        &Signal::Batch(BatchSummary {
                            batch_id: batch.batch_id.clone(),
                            agent_id: batch.agent_id.clone(),
                            event_count: events.len(),
                        }),
                    );
                    for event in events {
                        counter!(INGEST_EVENTS_TOTAL).increment(1);
                        self.dispatcher.publish(Topic::Event, &Signal::Event(event));
                    }
                }
                Err(error) => {
                    counter!(INGEST_BATCH_ERRORS_TOTAL, "reason" => decode_error_reason(&error))
                        .increment(1);
                    warn!(batch_id = %batch.batch_id, error = %error, "discarding batch");
                }
            },
            Ok(ServerFrame::Stats(stats)) => {
                self.dispatcher.publish(Topic::Stats, &Signal::Stats(stats));
            }
            Err(error) => {
                counter!(INGEST_PROTOCOL_ERRORS_TOTAL).increment(1);
                warn!(error = %error, "dropping malformed frame");
            }
        }
    }
}

fn decode_error_reason(error: &DecodeError) -> &'static str {
    match error {
        DecodeError::ChecksumMismatch { .. } => "checksum_mismatch",
        DecodeError::UnsupportedCodec(_) => "unsupported_codec",
        DecodeError::Compression(_) => "decompression",
        DecodeError::MalformedEvent(_) => "malformed_event",
        DecodeError::CountMismatch { .. } => "count_mismatch",
    }
}
