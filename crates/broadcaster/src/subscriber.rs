//! Subscription handles and registry entries

use std::fmt;

use async_channel::Sender;
use uuid::Uuid;

/// Opaque handle identifying one registered subscriber
///
/// Random v4 UUIDs: a stale handle never names a later subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

/// Registry entry: the producer end of one subscriber queue
pub(crate) struct Subscriber<T> {
    /// Bounded subscriber queue
    pub(crate) queue: Sender<T>,
    /// Samples dropped because the queue was full
    pub(crate) dropped: u64,
}

impl<T> Subscriber<T> {
    pub(crate) fn new(queue: Sender<T>) -> Self {
        Self { queue, dropped: 0 }
    }

    /// Close the queue; the consumer drains what is left, then sees end-of-stream
    pub(crate) fn close(&self) {
        self.queue.close();
    }
}
