//! Sample event generators for development and tests.
//!
//! Deterministic in shape (counts, names, orderings) so assertions can rely
//! on them; timestamps come from the clock.

use std::collections::HashMap;

use crate::events::{Event, LogEvent, LogLevel, MetricEvent, MetricType, Protocol, TrafficEvent};

/// Generate `count` sample log events.
#[must_use]
pub fn log_events(count: usize) -> Vec<Event> {
    let sources = [
        "/var/log/nginx/access.log",
        "/var/log/app/application.log",
        "/var/log/syslog",
    ];
    let messages = [
        "User login successful",
        "API request completed in 45ms",
        "Database query executed",
        "Cache hit for key: user_123",
        "Started processing job",
    ];
    let base = chrono::Utc::now().timestamp_millis();

    (0..count)
        .map(|i| {
            Event::Log(LogEvent {
                timestamp: base + (i as i64) * 1000,
                source: sources[i % sources.len()].to_owned(),
                level: match i % 5 {
                    0 => LogLevel::Debug,
                    3 => LogLevel::Warning,
                    4 => LogLevel::Error,
                    _ => LogLevel::Info,
                },
                message: format!("{} ({i})", messages[i % messages.len()]),
                fields: HashMap::from([
                    ("request_id".to_owned(), format!("req_{i}")),
                    ("user_id".to_owned(), format!("user_{}", i % 100)),
                ]),
                tags: vec!["env:test".to_owned(), format!("instance:{}", i % 3)],
            })
        })
        .collect()
}

/// Generate `count` sample gauge metrics.
#[must_use]
pub fn metric_events(count: usize) -> Vec<Event> {
    let base = chrono::Utc::now().timestamp_millis();
    (0..count)
        .map(|i| {
            Event::Metric(MetricEvent {
                timestamp: base + (i as i64) * 10_000,
                name: "system.cpu.usage".to_owned(),
                value: 20.0 + (i as f64 % 60.0),
                metric_type: MetricType::Gauge,
                tags: HashMap::from([("host".to_owned(), format!("host-{}", i % 5))]),
                unit: Some("%".to_owned()),
            })
        })
        .collect()
}

/// Generate `count` sample traffic events.
#[must_use]
pub fn traffic_events(count: usize) -> Vec<Event> {
    let protocols = [Protocol::Http, Protocol::Https, Protocol::Tcp, Protocol::Udp];
    let base = chrono::Utc::now().timestamp_millis();
    (0..count)
        .map(|i| {
            Event::Traffic(TrafficEvent {
                timestamp: base + (i as i64) * 100,
                protocol: protocols[i % protocols.len()].clone(),
                src_ip: format!("192.168.1.{}", (i % 254) + 1),
                dst_ip: format!("10.0.0.{}", (i % 254) + 1),
                src_port: 50_000 + (i % 5000) as u16,
                dst_port: [80, 443, 3306, 5432][i % 4],
                bytes: ((i % 1000) + 100) as u64 * 1024,
                packets: ((i % 50) + 1) as u64,
                metadata: HashMap::new(),
            })
        })
        .collect()
}

/// A mixed workload: logs, metrics, and traffic interleaved.
#[must_use]
pub fn mixed_events(count: usize) -> Vec<Event> {
    let mut events = Vec::with_capacity(count);
    let logs = log_events(count);
    let metrics = metric_events(count);
    let traffic = traffic_events(count);
    for i in 0..count {
        events.push(match i % 3 {
            0 => logs[i].clone(),
            1 => metrics[i].clone(),
            _ => traffic[i].clone(),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_events_have_content() {
        let events = log_events(10);
        assert_eq!(events.len(), 10);
        for event in events {
            let Event::Log(log) = event else {
                panic!("expected log event");
            };
            assert!(!log.message.is_empty());
            assert!(!log.source.is_empty());
        }
    }

    #[test]
    fn metric_events_are_gauges_with_units() {
        let events = metric_events(5);
        assert_eq!(events.len(), 5);
        for event in events {
            let Event::Metric(metric) = event else {
                panic!("expected metric event");
            };
            assert_eq!(metric.metric_type, MetricType::Gauge);
            assert_eq!(metric.unit.as_deref(), Some("%"));
        }
    }

    #[test]
    fn traffic_events_have_nonzero_volume() {
        for event in traffic_events(10) {
            let Event::Traffic(traffic) = event else {
                panic!("expected traffic event");
            };
            assert!(traffic.bytes > 0);
            assert!(traffic.packets > 0);
        }
    }

    #[test]
    fn mixed_events_interleave_variants() {
        let events = mixed_events(6);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].event_type(), "log");
        assert_eq!(events[1].event_type(), "metric");
        assert_eq!(events[2].event_type(), "traffic");
    }
}
