//! Change notification for cart views.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Something that wants to know when the cart changed.
///
/// The notification carries no payload; observers re-read the cart.
pub trait CartObserver: Send + Sync {
    fn cart_changed(&self);
}

impl<F> CartObserver for F
where
    F: Fn() + Send + Sync,
{
    fn cart_changed(&self) {
        self()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Registry of observers.
#[derive(Default)]
#[cfg_attr(not(feature = "storage"), allow(dead_code))]
pub(crate) struct Observers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(Subscription, Arc<dyn CartObserver>)>>,
}

#[cfg_attr(not(feature = "storage"), allow(dead_code))]
impl Observers {
    pub(crate) fn subscribe(&self, observer: Arc<dyn CartObserver>) -> Subscription {
        let sub = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((sub, observer));
        sub
    }

    pub(crate) fn unsubscribe(&self, sub: Subscription) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let len_before = entries.len();
        entries.retain(|(s, _)| *s != sub);
        entries.len() < len_before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Call every observer. The list is copied first so an observer may
    /// subscribe or unsubscribe from inside its callback.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<Arc<dyn CartObserver>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        for observer in snapshot {
            observer.cart_changed();
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_and_unsubscribe() {
        let observers = Observers::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = observers.subscribe(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        observers.notify();
        observers.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(observers.unsubscribe(sub));
        assert!(!observers.unsubscribe(sub));
        observers.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscriptions_are_distinct() {
        let observers = Observers::default();
        let a = observers.subscribe(Arc::new(|| {}));
        let b = observers.subscribe(Arc::new(|| {}));
        assert_ne!(a, b);
        assert_eq!(observers.len(), 2);
    }
}
