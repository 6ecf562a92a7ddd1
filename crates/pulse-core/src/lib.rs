//! # pulse-core
//!
//! Wire schema and error taxonomy for the pulse telemetry ingest client.
//!
//! This crate provides the shared vocabulary the other pulse crates depend on:
//!
//! - **Events**: [`events::Event`] tagged union over log, metric, and traffic
//!   telemetry, with the ordered [`events::LogLevel`] scale
//! - **Envelope**: [`batch::Batch`] — the checksummed, compressed transport
//!   container — plus [`batch::IngestResponse`] and [`batch::DashboardStats`]
//! - **Frames**: [`frame::ServerFrame`] inbound frame union with explicit
//!   discriminant matching
//! - **Errors**: [`errors::ProtocolError`] and [`errors::DecodeError`] via
//!   `thiserror`
//! - **Test data**: [`test_data`] generators for realistic sample events
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `pulse-codec` and `pulse-client`.

#![deny(unsafe_code)]

pub mod batch;
pub mod errors;
pub mod events;
pub mod frame;
pub mod test_data;

pub use batch::{Batch, Compression, DashboardStats, IngestResponse, IngestStatus};
pub use errors::{DecodeError, EncodeError, ProtocolError};
pub use events::{Event, LogEvent, LogLevel, MetricEvent, MetricType, Protocol, TrafficEvent};
pub use frame::ServerFrame;
