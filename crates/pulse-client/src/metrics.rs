//! Metric name constants.
//!
//! Collected in one place to avoid typos across modules. Recorded with the
//! `metrics` facade; the host process decides whether to install an exporter.

/// Inbound frames observed (counter).
pub const INGEST_FRAMES_TOTAL: &str = "ingest_frames_total";
/// Malformed or unknown-kind frames dropped (counter).
pub const INGEST_PROTOCOL_ERRORS_TOTAL: &str = "ingest_protocol_errors_total";
/// Batches verified and decoded (counter).
pub const INGEST_BATCHES_DECODED_TOTAL: &str = "ingest_batches_decoded_total";
/// Batches discarded (counter, labels: reason).
pub const INGEST_BATCH_ERRORS_TOTAL: &str = "ingest_batch_errors_total";
/// Events delivered to the `event` topic (counter).
pub const INGEST_EVENTS_TOTAL: &str = "ingest_events_total";
/// Successful connection establishments (counter).
pub const INGEST_CONNECTS_TOTAL: &str = "ingest_connects_total";
/// Reconnection attempts scheduled (counter).
pub const INGEST_RECONNECT_ATTEMPTS_TOTAL: &str = "ingest_reconnect_attempts_total";
/// Mid-stream transport errors surfaced as `error` signals (counter).
pub const INGEST_TRANSPORT_ERRORS_TOTAL: &str = "ingest_transport_errors_total";
/// Outbound payloads dropped because the connection was not open (counter).
pub const INGEST_SENDS_DROPPED_TOTAL: &str = "ingest_sends_dropped_total";
/// Subscriber delivery failures, isolated per handle (counter, labels: topic).
pub const DISPATCH_SUBSCRIBER_ERRORS_TOTAL: &str = "dispatch_subscriber_errors_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            INGEST_FRAMES_TOTAL,
            INGEST_PROTOCOL_ERRORS_TOTAL,
            INGEST_BATCHES_DECODED_TOTAL,
            INGEST_BATCH_ERRORS_TOTAL,
            INGEST_EVENTS_TOTAL,
            INGEST_CONNECTS_TOTAL,
            INGEST_RECONNECT_ATTEMPTS_TOTAL,
            INGEST_TRANSPORT_ERRORS_TOTAL,
            INGEST_SENDS_DROPPED_TOTAL,
            DISPATCH_SUBSCRIBER_ERRORS_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
