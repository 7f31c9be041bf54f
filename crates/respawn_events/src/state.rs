//! # Observable State Cell
//!
//! Holds a value and a subscriber list. Setting an equal value is a no-op;
//! setting a different value (or forcing) notifies every subscriber with
//! the new value. Notification happens against a snapshot of the
//! subscriber list taken inside the lock and invoked outside it, so a
//! callback may read the cell or register further subscribers without
//! deadlocking.

use std::sync::Arc;

use parking_lot::Mutex;

/// Identifier returned by [`State::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

/// Observable value cell.
///
/// # Example
///
/// ```rust,ignore
/// let health = State::new(100);
/// let id = health.subscribe(|hp| println!("hp is now {hp}"));
///
/// health.set(90);  // notifies
/// health.set(90);  // equal value, no notification
/// health.unsubscribe(id);
/// ```
pub struct State<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone + PartialEq> State<T> {
    /// Creates a cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: initial,
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Returns a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.lock().value.clone()
    }

    /// Stores `value` and notifies subscribers, unless it equals the
    /// current value (then nothing happens).
    pub fn set(&self, value: T) {
        let snapshot = {
            let mut inner = self.inner.lock();
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.subscribers.clone()
        };
        Self::notify(&snapshot, &value);
    }

    /// Stores `value` and notifies subscribers even if the value did not
    /// change.
    pub fn set_force(&self, value: T) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.value = value.clone();
            inner.subscribers.clone()
        };
        Self::notify(&snapshot, &value);
    }

    /// Registers a change callback.
    ///
    /// The callback receives the new value on every accepted `set` and on
    /// every `set_force`, from the thread performing the set.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber.
    ///
    /// # Returns
    ///
    /// `true` if the subscription existed. Unsubscribing twice is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        inner.subscribers.len() != before
    }

    /// Removes every subscriber.
    pub fn clear_subscribers(&self) {
        self.inner.lock().subscribers.clear();
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn notify(snapshot: &[(SubscriptionId, Callback<T>)], value: &T) {
        for (_, callback) in snapshot {
            callback(value);
        }
    }
}

impl<T: Clone + PartialEq + Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_set_notifies_with_new_value() {
        let state = State::new(0);
        let seen = Arc::new(AtomicU32::new(0));

        let seen_in_cb = Arc::clone(&seen);
        state.subscribe(move |value| {
            seen_in_cb.store(*value, Ordering::SeqCst);
        });

        state.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(state.get(), 7);
    }

    #[test]
    fn test_equal_value_is_suppressed() {
        let state = State::new(5);
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in_cb = Arc::clone(&calls);
        state.subscribe(move |_| {
            calls_in_cb.fetch_add(1, Ordering::SeqCst);
        });

        state.set(5);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        state.set_force(5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let state = State::new(0);
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in_cb = Arc::clone(&calls);
        let id = state.subscribe(move |_| {
            calls_in_cb.fetch_add(1, Ordering::SeqCst);
        });

        state.set(1);
        assert!(state.unsubscribe(id));
        state.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!state.unsubscribe(id));
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_may_reenter_the_cell() {
        // Notification runs outside the lock: a subscriber reading the cell
        // or registering another subscriber must not deadlock.
        let state = Arc::new(State::new(0));
        let observed = Arc::new(AtomicU32::new(0));

        let state_in_cb = Arc::clone(&state);
        let observed_in_cb = Arc::clone(&observed);
        state.subscribe(move |_| {
            observed_in_cb.store(state_in_cb.get(), Ordering::SeqCst);
            state_in_cb.subscribe(|_| {});
        });

        state.set(42);
        assert_eq!(observed.load(Ordering::SeqCst), 42);
        assert_eq!(state.subscriber_count(), 2);
    }

    #[test]
    fn test_clear_subscribers() {
        let state = State::new(0);
        state.subscribe(|_| {});
        state.subscribe(|_| {});
        assert_eq!(state.subscriber_count(), 2);

        state.clear_subscribers();
        assert_eq!(state.subscriber_count(), 0);
    }
}
