//! Telemetry event types.
//!
//! [`Event`] is a tagged union over three telemetry families — logs, metrics,
//! and network traffic. The active variant is determined solely by the
//! explicit `type` discriminant carried on the wire; decoders never infer a
//! variant from payload shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single telemetry event as it travels on the wire.
///
/// Events are immutable value objects: they are handed to subscribers by
/// value with no back-references to connection state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Log line from file tailing or journald.
    Log(LogEvent),
    /// Numeric sample from system or Prometheus collectors.
    Metric(MetricEvent),
    /// Flow record from packet capture.
    Traffic(TrafficEvent),
}

impl Event {
    /// Epoch-millisecond timestamp of the event, regardless of variant.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Event::Log(e) => e.timestamp,
            Event::Metric(e) => e.timestamp,
            Event::Traffic(e) => e.timestamp,
        }
    }

    /// Wire discriminant for the active variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Log(_) => "log",
            Event::Metric(_) => "metric",
            Event::Traffic(_) => "traffic",
        }
    }
}

/// A log event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Origin of the line (file path, unit name).
    pub source: String,
    /// Severity on the ordered scale.
    pub level: LogLevel,
    /// Log message body.
    pub message: String,
    /// Structured key/value context extracted from the line.
    pub fields: HashMap<String, String>,
    /// Free-form tags (`env:prod` style).
    pub tags: Vec<String>,
}

/// Log severity. Ordered: `Trace < Debug < Info < Warning < Error < Critical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained diagnostics.
    Trace,
    /// Developer diagnostics.
    Debug,
    /// Routine operational messages.
    Info,
    /// Something unexpected but recoverable.
    Warning,
    /// An operation failed.
    Error,
    /// The emitting system is unusable.
    Critical,
}

/// A metric sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Dotted metric name (`system.cpu.usage`).
    pub name: String,
    /// Sampled value.
    pub value: f64,
    /// Metric semantics.
    pub metric_type: MetricType,
    /// Dimension labels.
    pub tags: HashMap<String, String>,
    /// Unit of `value`, when the collector knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Semantics of a metric sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Monotonically increasing total.
    Counter,
    /// Point-in-time value.
    Gauge,
    /// Bucketed distribution.
    Histogram,
    /// Quantile summary.
    Summary,
}

/// A network flow record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficEvent {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Application or transport protocol.
    pub protocol: Protocol,
    /// Source address.
    pub src_ip: String,
    /// Destination address.
    pub dst_ip: String,
    /// Source port.
    pub src_port: u16,
    /// Destination port.
    pub dst_port: u16,
    /// Bytes observed in the flow.
    pub bytes: u64,
    /// Packets observed in the flow.
    pub packets: u64,
    /// Collector-specific annotations.
    pub metadata: HashMap<String, String>,
}

/// Protocol of a traffic event.
///
/// Serialized as a plain uppercase string both ways; values the client does
/// not recognize round-trip through [`Protocol::Other`] rather than failing
/// the whole event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// TLS HTTP.
    Https,
    /// Raw TCP.
    Tcp,
    /// Raw UDP.
    Udp,
    /// ICMP.
    Icmp,
    /// DNS.
    Dns,
    /// Any protocol string the client does not recognize.
    Other(String),
}

impl Protocol {
    /// Canonical wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Dns => "DNS",
            Protocol::Other(s) => s,
        }
    }
}

impl From<String> for Protocol {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HTTP" => Protocol::Http,
            "HTTPS" => Protocol::Https,
            "TCP" => Protocol::Tcp,
            "UDP" => Protocol::Udp,
            "ICMP" => Protocol::Icmp,
            "DNS" => Protocol::Dns,
            _ => Protocol::Other(s),
        }
    }
}

impl From<Protocol> for String {
    fn from(p: Protocol) -> Self {
        p.as_str().to_owned()
    }
}
