//! Transport trait seam and the tungstenite implementation.
//!
//! The connection manager only ever talks to [`Transport`], [`FrameReader`],
//! and [`FrameWriter`], so tests can drive the full lifecycle with the mocks
//! in [`crate::testutil`] while production uses [`WsTransport`].
//!
//! A [`Connection`] comes pre-split into reader and writer halves: the
//! receive loop owns the reader while a writer task drains the outbound
//! queue, so neither side ever blocks the other.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection-level failures. These feed the reconnection policy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached or rejected the handshake.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The established connection failed mid-stream.
    #[error("transport error: {0}")]
    Io(String),
}

/// Factory for message-framed connections to the ingest endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to `url` (credential already attached).
    async fn connect(&self, url: &str) -> Result<Connection, TransportError>;
}

/// One established connection, split into its two halves.
pub struct Connection {
    /// Inbound frames.
    pub reader: Box<dyn FrameReader>,
    /// Outbound frames and close.
    pub writer: Box<dyn FrameWriter>,
}

/// Inbound half of a connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Next inbound text frame. `None` means the peer closed the connection.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;
}

/// Outbound half of a connection.
#[async_trait]
pub trait FrameWriter: Send {
    /// Send one outbound text frame.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Close the connection. Idempotent best-effort.
    async fn close(&mut self);
}

/// Production transport over `tokio-tungstenite`.
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!(status = %response.status(), "websocket connected");
        let (sink, stream) = stream.split();
        Ok(Connection {
            reader: Box::new(WsReader { stream }),
            writer: Box::new(WsWriter { sink }),
        })
    }
}

struct WsReader {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameReader for WsReader {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        // Control frames are handled here so the manager only sees text.
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Binary(data)) => {
                    debug!(len = data.len(), "ignoring binary frame");
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(TransportError::Io(e.to_string()))),
            }
        }
    }
}

struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameWriter for WsWriter {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}
