//! Inbound frame classification.
//!
//! The collector pushes UTF-8 frames shaped `{ "type": <kind>, "data": ... }`.
//! Parsing is two-stage: the envelope is read first, then the discriminant is
//! matched exhaustively and the payload decoded against the matching schema.
//! An unknown discriminant is a distinct, explicitly handled error, never a
//! silent default.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::batch::{Batch, DashboardStats};
use crate::errors::ProtocolError;
use crate::events::Event;

/// A classified inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerFrame {
    /// A single already-decoded event, dispatched directly.
    Event(Event),
    /// A compressed envelope, handed to the integrity unit before dispatch.
    Batch(Batch),
    /// Aggregate counters — status information, not telemetry.
    Stats(DashboardStats),
}

/// Raw envelope: discriminant plus an untouched payload.
///
/// `RawValue` defers payload parsing until the kind is known, so a bogus
/// payload under a known kind and an unknown kind report as different errors.
#[derive(Deserialize)]
struct RawFrame<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(borrow)]
    data: &'a RawValue,
}

impl ServerFrame {
    /// Parse one frame of text from the transport.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawFrame<'_> = serde_json::from_str(text)?;
        match raw.kind {
            "event" => Ok(ServerFrame::Event(serde_json::from_str(raw.data.get())?)),
            "batch" => Ok(ServerFrame::Batch(serde_json::from_str(raw.data.get())?)),
            "stats" => Ok(ServerFrame::Stats(serde_json::from_str(raw.data.get())?)),
            other => Err(ProtocolError::UnknownKind(other.to_owned())),
        }
    }

    /// Frame kind, usable as a log/metric label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ServerFrame::Event(_) => "event",
            ServerFrame::Batch(_) => "batch",
            ServerFrame::Stats(_) => "stats",
        }
    }
}
