//! Drop guard over the subscriptions a session holds

use std::sync::Arc;

use broadcaster::{Broadcaster, SubscriptionId};

/// Subscriptions made by one session, released exactly once
///
/// Entries are recorded as they are made, so a partially joined session
/// still cleans up. Dropping the set releases whatever is left.
pub struct SubscriptionSet<T: Clone + Send + 'static> {
    entries: Vec<(Arc<Broadcaster<T>>, SubscriptionId)>,
}

impl<T: Clone + Send + 'static> SubscriptionSet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a subscription made on `broadcaster`
    pub fn push(&mut self, broadcaster: Arc<Broadcaster<T>>, id: SubscriptionId) {
        self.entries.push((broadcaster, id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unsubscribe every recorded entry; later calls are no-ops
    ///
    /// Returns how many entries were still registered.
    pub fn release(&mut self) -> usize {
        std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|(broadcaster, id)| broadcaster.unsubscribe(*id))
            .count()
    }
}

impl<T: Clone + Send + 'static> Default for SubscriptionSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Drop for SubscriptionSet<T> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_once() {
        let broadcaster = Arc::new(Broadcaster::<u32>::new("a"));
        let (tx, rx) = async_channel::bounded(4);

        let mut set = SubscriptionSet::new();
        set.push(Arc::clone(&broadcaster), broadcaster.subscribe(tx));
        assert_eq!(set.len(), 1);

        assert_eq!(set.release(), 1);
        assert!(rx.is_closed());
        assert_eq!(set.release(), 0);
        assert!(set.is_empty());
        assert_eq!(broadcaster.metrics().unsubscribed(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let a = Arc::new(Broadcaster::<u32>::new("a"));
        let b = Arc::new(Broadcaster::<u32>::new("b"));
        {
            let mut set = SubscriptionSet::new();
            let (tx, _rx) = async_channel::bounded(4);
            set.push(Arc::clone(&a), a.subscribe(tx));
            let (tx, _rx) = async_channel::bounded(4);
            set.push(Arc::clone(&b), b.subscribe(tx));
        }
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn test_already_removed_entry_is_skipped() {
        let broadcaster = Arc::new(Broadcaster::<u32>::new("a"));
        let (tx, _rx) = async_channel::bounded(4);
        let id = broadcaster.subscribe(tx);

        let mut set = SubscriptionSet::new();
        set.push(Arc::clone(&broadcaster), id);
        broadcaster.shutdown();

        assert_eq!(set.release(), 0);
    }
}
