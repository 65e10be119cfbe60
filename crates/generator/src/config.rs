//! Generator metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Generator metrics
#[derive(Debug, Default)]
pub struct GeneratorMetrics {
    /// Total samples pushed into the source queue
    pub samples_produced: AtomicU64,

    /// Source queue length after the last push
    pub queue_len: AtomicUsize,
}

impl GeneratorMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record sample produced
    pub fn record_produced(&self) {
        self.samples_produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_produced: self.samples_produced.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Total samples pushed into the source queue
    pub samples_produced: u64,

    /// Source queue length after the last push
    pub queue_len: usize,
}
