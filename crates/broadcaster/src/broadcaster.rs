//! Broadcaster - delivery loop and subscriber registry

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_channel::{Receiver, Sender, TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::metrics::BroadcastMetrics;
use crate::subscriber::{Subscriber, SubscriptionId};

const PROGRESS_EVERY: u64 = 100_000;

/// Outcome of delivering one item to the registered subscribers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Subscribers that accepted the item
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers whose consumer already went away
    pub closed: usize,
}

/// Fan-out of one series to a dynamic set of subscriber queues
///
/// The registry is the only state shared between the delivery loop and the
/// sessions. It is locked for a single insert, remove or
/// iterate-and-`try_send` pass and never across an `.await`.
pub struct Broadcaster<T> {
    series: String,
    subscribers: Mutex<HashMap<SubscriptionId, Subscriber<T>>>,
    metrics: Arc<BroadcastMetrics>,
    delivered_total: ::metrics::Counter,
    dropped_total: ::metrics::Counter,
    subscriber_gauge: ::metrics::Gauge,
}

impl<T: Clone + Send + 'static> Broadcaster<T> {
    /// Create a broadcaster with an empty registry
    pub fn new(series: impl Into<String>) -> Self {
        let series = series.into();
        Self {
            delivered_total: ::metrics::counter!(
                "wavecast_samples_delivered_total",
                "series" => series.clone()
            ),
            dropped_total: ::metrics::counter!(
                "wavecast_samples_dropped_total",
                "series" => series.clone()
            ),
            subscriber_gauge: ::metrics::gauge!(
                "wavecast_subscribers",
                "series" => series.clone()
            ),
            series,
            subscribers: Mutex::new(HashMap::new()),
            metrics: Arc::new(BroadcastMetrics::new()),
        }
    }

    /// Create a broadcaster and spawn its delivery loop over `source`
    pub fn spawn(series: impl Into<String>, source: Receiver<T>) -> (Arc<Self>, JoinHandle<()>) {
        let broadcaster = Arc::new(Self::new(series));
        let task = tokio::spawn(Arc::clone(&broadcaster).run(source));
        (broadcaster, task)
    }

    /// Delivery loop: one item at a time, in arrival order, until the source closes
    #[instrument(name = "broadcaster_run", skip_all, fields(series = %self.series))]
    pub async fn run(self: Arc<Self>, source: Receiver<T>) {
        info!(series = %self.series, "Broadcaster started");

        while let Ok(item) = source.recv().await {
            self.deliver(&item);

            let received = self.metrics.received();
            if received % PROGRESS_EVERY == 0 {
                debug!(
                    series = %self.series,
                    received,
                    subscribers = self.subscriber_count(),
                    "Broadcaster progress"
                );
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            series = %self.series,
            received = snapshot.received,
            delivered = snapshot.delivered,
            dropped = snapshot.dropped,
            "Broadcaster source closed"
        );
    }

    /// Offer `item` to every registered subscriber without blocking
    ///
    /// A full queue loses this item only for its own subscriber. Drops are
    /// counted, never logged. Subscribers registered after this call returns
    /// never see `item`.
    pub fn deliver(&self, item: &T) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        {
            let mut subscribers = self.registry();
            for subscriber in subscribers.values_mut() {
                match subscriber.queue.try_send(item.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        subscriber.dropped += 1;
                        report.dropped += 1;
                    }
                    // Consumer gone; its session's cleanup removes the entry.
                    Err(TrySendError::Closed(_)) => report.closed += 1,
                }
            }
        }

        self.metrics.inc_received();
        if report.delivered > 0 {
            self.metrics.add_delivered(report.delivered as u64);
            self.delivered_total.increment(report.delivered as u64);
        }
        if report.dropped > 0 {
            self.metrics.add_dropped(report.dropped as u64);
            self.dropped_total.increment(report.dropped as u64);
        }
        report
    }

    /// Register an empty, open subscriber queue
    ///
    /// The queue receives items starting with the next delivery; nothing
    /// delivered earlier is replayed.
    pub fn subscribe(&self, queue: Sender<T>) -> SubscriptionId {
        let id = SubscriptionId::new();
        let count = {
            let mut subscribers = self.registry();
            subscribers.insert(id, Subscriber::new(queue));
            subscribers.len()
        };

        self.metrics.inc_subscribed();
        self.subscriber_gauge.set(count as f64);
        debug!(series = %self.series, subscription = %id, subscribers = count, "Subscriber added");
        id
    }

    /// Remove a subscriber and close its queue
    ///
    /// Unknown or already-removed handles are a no-op; returns whether an
    /// entry was removed. Each queue is closed at most once.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.registry();
            let removed = subscribers.remove(&id);
            (removed, subscribers.len())
        };

        let Some(subscriber) = removed else {
            return false;
        };
        subscriber.close();

        self.metrics.add_unsubscribed(1);
        self.subscriber_gauge.set(count as f64);
        debug!(
            series = %self.series,
            subscription = %id,
            subscribers = count,
            dropped = subscriber.dropped,
            "Subscriber removed"
        );
        true
    }

    /// Close every registered queue and clear the registry
    #[instrument(name = "broadcaster_shutdown", skip(self), fields(series = %self.series))]
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.registry().drain().collect();
        for (_, subscriber) in &drained {
            subscriber.close();
        }

        self.metrics.add_unsubscribed(drained.len() as u64);
        self.subscriber_gauge.set(0.0);
        info!(series = %self.series, closed = drained.len(), "Broadcaster shut down");
    }
}

impl<T> Broadcaster<T> {
    /// Series name
    pub fn series(&self) -> &str {
        &self.series
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    /// Whether a handle is currently registered
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry().contains_key(&id)
    }

    /// Items dropped for one subscriber because its queue was full
    pub fn dropped_for(&self, id: SubscriptionId) -> Option<u64> {
        self.registry().get(&id).map(|s| s.dropped)
    }

    /// Get shared metrics
    pub fn metrics(&self) -> &Arc<BroadcastMetrics> {
        &self.metrics
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Subscriber<T>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
