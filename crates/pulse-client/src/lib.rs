//! # pulse-client
//!
//! Connection manager and event dispatcher for the pulse ingest stream.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `client` | Connection lifecycle, receive loop, reconnection backoff |
//! | `dispatch` | Topic-keyed observer registry: subscribe/unsubscribe, publish |
//! | `transport` | `Transport`/`Connection` trait seam + tungstenite impl |
//! | `config` | Endpoint and reconnect policy configuration |
//! | `health` | One-shot HTTP health probe |
//! | `metrics` | Metric name constants |
//! | `testutil` | Mock transport and recording subscriber for tests |
//!
//! ## Data Flow
//!
//! `transport` yields text frames → `client` classifies them
//! (`pulse_core::ServerFrame`), delegates batch envelopes to `pulse_codec`,
//! and publishes decoded events and status signals through `dispatch` to
//! whatever the rendering layer subscribed.
//!
//! Frames are processed strictly in arrival order, one at a time; a corrupt
//! frame or batch is logged and dropped without ever terminating the
//! connection.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod metrics;
pub mod testutil;
pub mod transport;

pub use client::{ConnectionState, IngestClient};
pub use config::{IngestConfig, ReconnectPolicy};
pub use dispatch::{BatchSummary, Dispatcher, Signal, Subscriber, SubscriptionId, Topic};
pub use health::{HealthError, check_health};
pub use transport::{Connection, FrameReader, FrameWriter, Transport, TransportError, WsTransport};
