//! Topic-keyed observer registry.
//!
//! Subscribers register a [`Subscriber`] handle against a [`Topic`];
//! [`Dispatcher::publish`] delivers synchronously, in registration order,
//! with each handle's failure isolated — an erroring or panicking subscriber
//! never prevents delivery to the rest and never reaches the receive loop.
//!
//! The registry may be mutated concurrently with a publish. Publish snapshots
//! the subscriber list and re-checks each handle's membership immediately
//! before delivering, so an unsubscribe that lands mid-publish suppresses
//! delivery to that handle on the current publish as well as later ones.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use parking_lot::RwLock;
use pulse_core::{DashboardStats, Event};
use tracing::warn;

use crate::metrics::DISPATCH_SUBSCRIBER_ERRORS_TOTAL;

/// Named channels subscribers register against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Transport established.
    Connected,
    /// Transport closed (any reason).
    Disconnected,
    /// Non-terminal transport error.
    Error,
    /// One decoded telemetry event.
    Event,
    /// A batch envelope was verified and decoded.
    Batch,
    /// Aggregate collector statistics.
    Stats,
}

impl Topic {
    /// Topic name, usable as a log/metric label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Connected => "connected",
            Topic::Disconnected => "disconnected",
            Topic::Error => "error",
            Topic::Event => "event",
            Topic::Batch => "batch",
            Topic::Stats => "stats",
        }
    }
}

/// Payload delivered to subscribers.
///
/// Immutable values with no back-references to connection state: a slow or
/// buggy subscriber can never corrupt ingestion.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// Published on [`Topic::Connected`].
    Connected,
    /// Published on [`Topic::Disconnected`].
    Disconnected,
    /// Published on [`Topic::Error`] with a transport error description.
    Error(String),
    /// Published on [`Topic::Event`], once per decoded event.
    Event(Event),
    /// Published on [`Topic::Batch`] after a successful decode.
    Batch(BatchSummary),
    /// Published on [`Topic::Stats`].
    Stats(DashboardStats),
}

/// Announcement of a successfully decoded batch.
///
/// The contained events travel individually on [`Topic::Event`]; this carries
/// only the envelope metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchSummary {
    /// Collector-assigned batch identifier.
    pub batch_id: String,
    /// Producing agent.
    pub agent_id: String,
    /// Number of events the batch contained.
    pub event_count: usize,
}

/// A delivery capability registered against a topic.
pub trait Subscriber: Send + Sync {
    /// Handle one signal. Errors are logged and counted, never propagated.
    fn deliver(&self, signal: &Signal) -> anyhow::Result<()>;
}

/// Opaque handle identifying one subscription for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscriber>,
}

/// Topic-keyed subscriber registry.
pub struct Dispatcher {
    topics: RwLock<HashMap<Topic, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `subscriber` on `topic`, returning its removal handle.
    ///
    /// Idempotent per identity: registering the same `Arc` on the same topic
    /// twice returns the original handle without adding a second entry.
    pub fn subscribe(&self, topic: Topic, subscriber: Arc<dyn Subscriber>) -> SubscriptionId {
        let mut topics = self.topics.write();
        let entries = topics.entry(topic).or_default();
        if let Some(existing) = entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.subscriber, &subscriber))
        {
            return existing.id;
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entries.push(Entry { id, subscriber });
        id
    }

    /// Remove the subscription `id` from `topic`. No-op when absent.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) {
        let mut topics = self.topics.write();
        if let Some(entries) = topics.get_mut(&topic) {
            entries.retain(|e| e.id != id);
        }
    }

    /// Deliver `signal` to every handle registered on `topic`, synchronously,
    /// in registration order.
    pub fn publish(&self, topic: Topic, signal: &Signal) {
        // Snapshot outside the lock so delivery never blocks the registry
        // and subscribers may themselves subscribe/unsubscribe.
        let snapshot: Vec<(SubscriptionId, Arc<dyn Subscriber>)> = {
            let topics = self.topics.read();
            match topics.get(&topic) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (e.id, Arc::clone(&e.subscriber)))
                    .collect(),
                None => return,
            }
        };

        for (id, subscriber) in snapshot {
            if !self.is_subscribed(topic, id) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| subscriber.deliver(signal))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    counter!(DISPATCH_SUBSCRIBER_ERRORS_TOTAL, "topic" => topic.as_str())
                        .increment(1);
                    warn!(topic = topic.as_str(), error = %error, "subscriber failed");
                }
                Err(_) => {
                    counter!(DISPATCH_SUBSCRIBER_ERRORS_TOTAL, "topic" => topic.as_str())
                        .increment(1);
                    warn!(topic = topic.as_str(), "subscriber panicked");
                }
            }
        }
    }

    /// Number of handles currently registered on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics.read().get(&topic).map_or(0, Vec::len)
    }

    fn is_subscribed(&self, topic: Topic, id: SubscriptionId) -> bool {
        self.topics
            .read()
            .get(&topic)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records every delivered signal.
    struct Recorder {
        signals: Mutex<Vec<Signal>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                signals: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.signals.lock().len()
        }
    }

    impl Subscriber for Recorder {
        fn deliver(&self, signal: &Signal) -> anyhow::Result<()> {
            self.signals.lock().push(signal.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Subscriber for Failing {
        fn deliver(&self, _signal: &Signal) -> anyhow::Result<()> {
            anyhow::bail!("subscriber exploded")
        }
    }

    struct Panicking;

    impl Subscriber for Panicking {
        fn deliver(&self, _signal: &Signal) -> anyhow::Result<()> {
            panic!("subscriber panicked")
        }
    }

    #[test]
    fn publish_reaches_subscriber() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let _id = dispatcher.subscribe(Topic::Connected, recorder.clone());

        dispatcher.publish(Topic::Connected, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        dispatcher.publish(Topic::Stats, &Signal::Disconnected);
    }

    #[test]
    fn delivery_is_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let order: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

        struct Tagged {
            tag: u8,
            order: Arc<Mutex<Vec<u8>>>,
        }
        impl Subscriber for Tagged {
            fn deliver(&self, _signal: &Signal) -> anyhow::Result<()> {
                self.order.lock().push(self.tag);
                Ok(())
            }
        }

        for tag in [1u8, 2, 3] {
            let _id = dispatcher.subscribe(
                Topic::Event,
                Arc::new(Tagged {
                    tag,
                    order: order.clone(),
                }),
            );
        }
        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(*order.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn subscribe_is_idempotent_per_identity() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let first = dispatcher.subscribe(Topic::Event, recorder.clone());
        let second = dispatcher.subscribe(Topic::Event, recorder.clone());
        assert_eq!(first, second);
        assert_eq!(dispatcher.subscriber_count(Topic::Event), 1);

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn same_handle_on_two_topics_is_two_subscriptions() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let a = dispatcher.subscribe(Topic::Event, recorder.clone());
        let b = dispatcher.subscribe(Topic::Stats, recorder.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let id = dispatcher.subscribe(Topic::Event, recorder.clone());

        dispatcher.publish(Topic::Event, &Signal::Connected);
        dispatcher.unsubscribe(Topic::Event, id);
        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
        assert_eq!(dispatcher.subscriber_count(Topic::Event), 0);
    }

    #[test]
    fn unsubscribe_absent_handle_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let id = dispatcher.subscribe(Topic::Event, recorder);
        dispatcher.unsubscribe(Topic::Stats, id);
        dispatcher.unsubscribe(Topic::Event, SubscriptionId(9999));
        assert_eq!(dispatcher.subscriber_count(Topic::Event), 1);
    }

    #[test]
    fn failing_subscriber_does_not_block_the_rest() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let _failing = dispatcher.subscribe(Topic::Event, Arc::new(Failing));
        let _id = dispatcher.subscribe(Topic::Event, recorder.clone());

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn panicking_subscriber_is_isolated() {
        let dispatcher = Dispatcher::new();
        let recorder = Recorder::new();
        let _panicking = dispatcher.subscribe(Topic::Event, Arc::new(Panicking));
        let _id = dispatcher.subscribe(Topic::Event, recorder.clone());

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn unsubscribe_during_publish_suppresses_current_delivery() {
        // First subscriber removes the second mid-publish; the second must
        // not see the in-flight signal nor any later one.
        let dispatcher = Arc::new(Dispatcher::new());
        let recorder = Recorder::new();

        struct Remover {
            dispatcher: Arc<Dispatcher>,
            target: Mutex<Option<SubscriptionId>>,
        }
        impl Subscriber for Remover {
            fn deliver(&self, _signal: &Signal) -> anyhow::Result<()> {
                if let Some(id) = self.target.lock().take() {
                    self.dispatcher.unsubscribe(Topic::Event, id);
                }
                Ok(())
            }
        }

        let remover = Arc::new(Remover {
            dispatcher: dispatcher.clone(),
            target: Mutex::new(None),
        });
        let _remover_id = dispatcher.subscribe(Topic::Event, remover.clone());
        let target_id = dispatcher.subscribe(Topic::Event, recorder.clone());
        *remover.target.lock() = Some(target_id);

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 0, "removed mid-publish, must not deliver");

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 0, "must stay removed on later publishes");
    }

    #[test]
    fn subscribe_during_publish_does_not_deliver_current_signal() {
        // The snapshot is taken at publish start; a subscriber added while
        // delivering only sees subsequent publishes.
        let dispatcher = Arc::new(Dispatcher::new());
        let recorder = Recorder::new();

        struct Adder {
            dispatcher: Arc<Dispatcher>,
            to_add: Mutex<Option<Arc<dyn Subscriber>>>,
        }
        impl Subscriber for Adder {
            fn deliver(&self, _signal: &Signal) -> anyhow::Result<()> {
                if let Some(sub) = self.to_add.lock().take() {
                    let _ = self.dispatcher.subscribe(Topic::Event, sub);
                }
                Ok(())
            }
        }

        let adder = Arc::new(Adder {
            dispatcher: dispatcher.clone(),
            to_add: Mutex::new(Some(recorder.clone())),
        });
        let _adder_id = dispatcher.subscribe(Topic::Event, adder);

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 0);

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn topics_are_independent() {
        let dispatcher = Dispatcher::new();
        let events = Recorder::new();
        let stats = Recorder::new();
        let _e = dispatcher.subscribe(Topic::Event, events.clone());
        let _s = dispatcher.subscribe(Topic::Stats, stats.clone());

        dispatcher.publish(Topic::Event, &Signal::Connected);
        assert_eq!(events.count(), 1);
        assert_eq!(stats.count(), 0);
    }

    #[test]
    fn topic_labels() {
        assert_eq!(Topic::Connected.as_str(), "connected");
        assert_eq!(Topic::Disconnected.as_str(), "disconnected");
        assert_eq!(Topic::Error.as_str(), "error");
        assert_eq!(Topic::Event.as_str(), "event");
        assert_eq!(Topic::Batch.as_str(), "batch");
        assert_eq!(Topic::Stats.as_str(), "stats");
    }
}
