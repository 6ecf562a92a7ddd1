//! # pulse-codec
//!
//! Integrity and decompression unit for batch envelopes.
//!
//! [`decode`] turns a received [`Batch`] into its events, in this order:
//!
//! 1. recompute the checksum over the still-compressed payload — a mismatch
//!    discards the batch before decompression ever runs
//! 2. dispatch decompression by the `compression` tag
//! 3. deserialize the discriminated event records
//! 4. validate the decoded count against the declared `event_count`
//!
//! A batch is atomic: any failure returns a [`DecodeError`] and no events.
//! [`encode`] is the counterpart used by tests and the collector contract.

#![deny(unsafe_code)]

pub mod checksum;
pub mod compress;

use pulse_core::{Batch, Compression, DecodeError, EncodeError, Event};
use tracing::debug;

/// Envelope metadata supplied by the encoding side.
#[derive(Clone, Debug)]
pub struct BatchMeta {
    /// Unique batch identifier.
    pub batch_id: String,
    /// Producing agent.
    pub agent_id: String,
    /// Host the agent runs on.
    pub hostname: String,
    /// Epoch milliseconds when the batch was sealed.
    pub timestamp: i64,
}

/// Verify and decode a batch into its events.
pub fn decode(batch: &Batch) -> Result<Vec<Event>, DecodeError> {
    // Integrity first: the payload stays opaque until the checksum holds.
    let actual = checksum::sha256_hex(&batch.compressed_data);
    if actual != batch.checksum {
        return Err(DecodeError::ChecksumMismatch {
            expected: batch.checksum.clone(),
            actual,
        });
    }

    if !compress::supported(batch.compression) {
        return Err(DecodeError::UnsupportedCodec(
            batch.compression.as_str().to_owned(),
        ));
    }
    let raw = compress::decompress(&batch.compressed_data, batch.compression)?;

    let events: Vec<Event> = serde_json::from_slice(&raw)?;

    if events.len() != batch.event_count {
        return Err(DecodeError::CountMismatch {
            declared: batch.event_count,
            actual: events.len(),
        });
    }

    Ok(events)
}

/// Serialize, compress, and checksum events into a batch envelope.
pub fn encode(
    events: &[Event],
    meta: BatchMeta,
    compression: Compression,
) -> Result<Batch, EncodeError> {
    let json = serde_json::to_vec(events)?;
    let compressed_data = compress::compress(&json, compression)?;
    let checksum = checksum::sha256_hex(&compressed_data);

    debug!(
        batch_id = %meta.batch_id,
        codec = compression.as_str(),
        original_bytes = json.len(),
        compressed_bytes = compressed_data.len(),
        "sealed batch"
    );

    Ok(Batch {
        batch_id: meta.batch_id,
        agent_id: meta.agent_id,
        hostname: meta.hostname,
        timestamp: meta.timestamp,
        event_count: events.len(),
        compression,
        compressed_data,
        checksum,
    })
}
