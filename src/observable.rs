use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use crate::domain::{Point, UpdateType};

type Callback = Arc<dyn Fn(UpdateType, Option<&Point>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(usize);

/// Broadcast change notifications to every subscriber
///
/// There are no topics: each callback receives every `(UpdateType, payload)` pair, in the
/// order callbacks were subscribed.
#[derive(Default)]
pub struct Observable {
    next_id: AtomicUsize,
    observers: RwLock<BTreeMap<SubscriptionId, Callback>>,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(UpdateType, Option<&Point>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        id
    }

    /// Returns `false` if the subscription was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn notify(&self, update_type: UpdateType, payload: Option<&Point>) {
        // Callbacks run outside the lock so they can subscribe or unsubscribe.
        let observers: Vec<Callback> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for observer in observers {
            observer(update_type, payload);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::sync::Mutex;

    #[test]
    fn test_notify_in_subscription_order() {
        let observable = Observable::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second"] {
            let seen = seen.clone();
            observable.subscribe(move |update_type, _| {
                seen.lock().unwrap().push((name, update_type));
            });
        }

        observable.notify(UpdateType::Major, None);

        assert_that!(*seen.lock().unwrap())
            .is_equal_to(vec![("first", UpdateType::Major), ("second", UpdateType::Major)]);
    }

    #[test]
    fn test_unsubscribe() {
        let observable = Observable::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = {
            let calls = calls.clone();
            observable.subscribe(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert_that!(observable.unsubscribe(id)).is_true();
        assert_that!(observable.unsubscribe(id)).is_false();
        observable.notify(UpdateType::Init, None);

        assert_that!(calls.load(Ordering::SeqCst)).is_equal_to(0);
        assert_that!(observable.subscriber_count()).is_equal_to(0);
    }

    #[test]
    fn test_callback_can_subscribe() {
        let observable = Arc::new(Observable::new());
        {
            let inner = observable.clone();
            observable.subscribe(move |_, _| {
                inner.subscribe(|_, _| {});
            });
        }

        observable.notify(UpdateType::Minor, None);

        assert_that!(observable.subscriber_count()).is_equal_to(2);
    }
}
