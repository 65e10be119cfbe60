//! Broadcast metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single broadcaster
#[derive(Debug, Default)]
pub struct BroadcastMetrics {
    /// Samples consumed from the source
    received: AtomicU64,
    /// Successful enqueues across all subscribers
    delivered: AtomicU64,
    /// Enqueues skipped because a subscriber queue was full
    dropped: AtomicU64,
    /// Subscriptions registered
    subscribed: AtomicU64,
    /// Subscriptions removed
    unsubscribed: AtomicU64,
}

impl BroadcastMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get received count
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Increment received count
    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get delivered count
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Add to delivered count
    pub fn add_delivered(&self, n: u64) {
        self.delivered.fetch_add(n, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Add to dropped count
    pub fn add_dropped(&self, n: u64) {
        self.dropped.fetch_add(n, Ordering::Relaxed);
    }

    /// Get subscribed count
    pub fn subscribed(&self) -> u64 {
        self.subscribed.load(Ordering::Relaxed)
    }

    /// Increment subscribed count
    pub fn inc_subscribed(&self) {
        self.subscribed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get unsubscribed count
    pub fn unsubscribed(&self) -> u64 {
        self.unsubscribed.load(Ordering::Relaxed)
    }

    /// Add to unsubscribed count
    pub fn add_unsubscribed(&self, n: u64) {
        self.unsubscribed.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            delivered: self.delivered(),
            dropped: self.dropped(),
            subscribed: self.subscribed(),
            unsubscribed: self.unsubscribed(),
        }
    }
}

/// Snapshot of broadcast metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub subscribed: u64,
    pub unsubscribed: u64,
}
