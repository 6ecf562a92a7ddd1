//! Client configuration.
//!
//! Plain value structs handed to [`crate::IngestClient::new`] — there is no
//! ambient global configuration. Compiled defaults match the collector's
//! development setup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection endpoint and retry policy for the ingest client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// WebSocket ingest endpoint. The bearer token is appended as a
    /// `token` query parameter at connect time.
    pub ingest_url: String,
    /// Health endpoint polled by the rendering layer.
    pub health_url: String,
    /// Reconnection backoff policy.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            ingest_url: "ws://localhost:8080/ingest".to_owned(),
            health_url: "http://localhost:8080/health".to_owned(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Exponential backoff between reconnection attempts.
///
/// Delay for attempt `n` (0-based) is `base_delay * 2^n`. After
/// `max_attempts` consecutive failures the client parks in a terminal
/// disconnected state until an explicit `connect` call. No jitter.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    #[serde(with = "duration_millis")]
    pub base_delay: Duration,
    /// Consecutive failures tolerated before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Backoff delay for the given 0-based attempt counter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

mod duration_millis {
    //! Serialize `Duration` as integer milliseconds (`base_delay_ms` style).

    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
