//! Error taxonomy for frame and batch handling.
//!
//! Layering mirrors the recovery policy: [`ProtocolError`] means one inbound
//! frame was unusable (frame dropped, connection kept alive), [`DecodeError`]
//! means one batch was unusable (batch discarded, connection kept alive).
//! Neither ever unwinds the receive loop.

use thiserror::Error;

/// A malformed or unrecognized inbound frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON or did not match the envelope shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `type` discriminant named a kind this client does not know.
    ///
    /// Distinct from [`ProtocolError::Malformed`]: the envelope parsed fine,
    /// the discriminant is simply outside the contract.
    #[error("unknown frame kind: {0:?}")]
    UnknownKind(String),
}

/// A batch that failed integrity verification or decoding.
///
/// Batches are atomic: any of these discards the whole batch with no partial
/// acceptance.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Recomputed checksum does not match the declared one.
    ///
    /// Raised before any decompression runs; the payload is never touched.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum declared in the envelope.
        expected: String,
        /// Checksum recomputed over the payload.
        actual: String,
    },

    /// The `compression` tag names a codec this build cannot decompress.
    #[error("unsupported compression codec: {0}")]
    UnsupportedCodec(String),

    /// Decompression itself failed (truncated or corrupt payload).
    #[error("decompression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// A record in the decompressed payload was not a valid event.
    #[error("malformed event in batch: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// Decoded event count disagrees with the declared `event_count`.
    #[error("event count mismatch: declared {declared}, decoded {actual}")]
    CountMismatch {
        /// `event_count` from the envelope.
        declared: usize,
        /// Number of events actually decoded.
        actual: usize,
    },
}

/// A batch that could not be assembled on the encode side.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Events could not be serialized.
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression failed.
    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}
