//! Batch envelope and collector acknowledgement types.
//!
//! A [`Batch`] is the unit of transport: an atomically checksummed,
//! compressed container of multiple telemetry events. The envelope metadata
//! is distinct from the events it contains — the payload stays opaque until
//! `pulse-codec` has verified the checksum.

use serde::{Deserialize, Serialize};

/// The transport envelope for a group of events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Collector-assigned unique identifier.
    pub batch_id: String,
    /// Agent that produced the contained events.
    pub agent_id: String,
    /// Hostname the agent runs on.
    pub hostname: String,
    /// Epoch milliseconds when the batch was sealed.
    pub timestamp: i64,
    /// Declared number of events recoverable after decompression.
    ///
    /// A hint for preallocation; validated post-decode. A disagreement is a
    /// decode error, never a silent truncation or padding.
    pub event_count: usize,
    /// Codec applied to `compressed_data`.
    pub compression: Compression,
    /// Opaque compressed payload.
    pub compressed_data: Vec<u8>,
    /// Hex SHA-256 over `compressed_data`.
    pub checksum: String,
}

/// Compression codec applied to a batch payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Payload is the raw serialized events.
    None,
    /// Snappy raw block format.
    Snappy,
    /// LZ4 block format with a length prefix.
    Lz4,
    /// Gzip via DEFLATE.
    Gzip,
}

impl Compression {
    /// Wire spelling, usable as a log/metric label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Snappy => "snappy",
            Compression::Lz4 => "lz4",
            Compression::Gzip => "gzip",
        }
    }
}

/// Collector acknowledgement for a submitted batch.
///
/// Not consumed by the receive loop, but part of the shared wire contract:
/// the collector delivers these out-of-band and both sides must agree on the
/// shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Batch being acknowledged.
    pub batch_id: String,
    /// Outcome of ingestion.
    pub status: IngestStatus,
    /// Failure detail when `status` is not success.
    pub error_message: Option<String>,
    /// Epoch milliseconds when the collector received the batch.
    pub received_at: i64,
}

/// Outcome reported in an [`IngestResponse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    /// Everything stored.
    Success,
    /// Some events stored, some rejected.
    PartialSuccess,
    /// Nothing stored.
    Failed,
    /// Batch refused outright (auth, quota, malformed).
    Rejected,
}

/// Aggregate counters pushed on `stats` frames.
///
/// Status information for the rendering layer, not telemetry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Events ingested since collector start.
    pub total_events: u64,
    /// Current ingest rate.
    pub events_per_second: u64,
    /// Agents ever seen.
    pub total_agents: u32,
    /// Agents currently reporting.
    pub online_agents: u32,
    /// Error-level log events in the current window.
    pub error_count: u64,
    /// Warning-level log events in the current window.
    pub warning_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_tag_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&Compression::Snappy).unwrap(),
            "\"snappy\""
        );
        assert_eq!(
            serde_json::from_str::<Compression>("\"gzip\"").unwrap(),
            Compression::Gzip
        );
    }

    #[test]
    fn batch_round_trip() {
        let batch = Batch {
            batch_id: "batch-001".into(),
            agent_id: "agent-001".into(),
            hostname: "web-server-01".into(),
            timestamp: 1_700_000_000_000,
            event_count: 3,
            compression: Compression::None,
            compressed_data: vec![1, 2, 3],
            checksum: "abc".into(),
        };
        let json = serde_json::to_string(&batch).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn ingest_response_round_trip() {
        let response = IngestResponse {
            batch_id: "batch-001".into(),
            status: IngestStatus::PartialSuccess,
            error_message: Some("2 events rejected".into()),
            received_at: 1_700_000_000_500,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"partial_success\""));
        let back: IngestResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn unknown_compression_value_is_an_error() {
        let err = serde_json::from_str::<Compression>("\"zstd\"");
        assert!(err.is_err());
    }

    #[test]
    fn dashboard_stats_round_trip() {
        let stats = DashboardStats {
            total_events: 1_250_000,
            events_per_second: 152,
            total_agents: 12,
            online_agents: 10,
            error_count: 45,
            warning_count: 128,
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: DashboardStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
