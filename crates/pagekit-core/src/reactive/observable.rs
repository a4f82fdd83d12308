//! Shared observable value cell backed by a `tokio::sync::watch` channel.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

/// Callback run on the writer's thread after each published mutation.
pub(crate) type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Weakly held listeners; dropping the last strong handle unregisters.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Mutex<Vec<Weak<dyn Fn() + Send + Sync>>>,
}

impl Listeners {
    fn register(&self, listener: &ChangeListener) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(listener));
    }

    fn notify(&self) {
        let live: Vec<ChangeListener> = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|entry| entry.strong_count() > 0);
            entries.iter().filter_map(Weak::upgrade).collect()
        };
        // Called without the list lock so listeners may register others.
        for listener in live {
            listener();
        }
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}

struct ObservableInner<T> {
    tx: watch::Sender<T>,
    version: AtomicU64,
    listeners: Arc<Listeners>,
}

/// A shared value container that notifies subscribers on mutation.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
/// Handles are `Send + Sync` whenever `T` is, so one task can write while
/// others read or await changes.
pub struct Observable<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.tx.borrow())
            .field("version", &self.version())
            .finish()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Create an observable holding `value`, at version 0.
    pub fn new(value: T) -> Self {
        // Sends below use the send_* variants that succeed without receivers.
        let (tx, _rx) = watch::channel(value);
        Self {
            inner: Arc::new(ObservableInner {
                tx,
                version: AtomicU64::new(0),
                listeners: Arc::default(),
            }),
        }
    }

    /// Access the current value by reference.
    ///
    /// The closure runs under the channel's read lock; it must not write to
    /// this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.tx.borrow())
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(move |current| *current = value);
    }

    /// Mutate the value in place and notify subscribers.
    ///
    /// Derived [`Computed`](super::Computed) values are recomputed on the
    /// calling thread before this returns.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.inner.tx.send_modify(|current| {
            f(current);
            self.inner.version.fetch_add(1, Ordering::AcqRel);
        });
        self.inner.listeners.notify();
    }

    /// Receiver that observes every subsequent mutation.
    ///
    /// The current value is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.inner.tx.subscribe()
    }

    /// Number of mutations applied so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Number of live receivers, including those held by derived values.
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// Number of live derived values recomputed on each mutation.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl<T: Clone> Observable<T> {
    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.tx.borrow().clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Replace the value only if it differs from the current one.
    ///
    /// Returns `true` when subscribers were notified.
    pub fn set_if_changed(&self, value: T) -> bool {
        let changed = self.inner.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            self.inner.version.fetch_add(1, Ordering::AcqRel);
            true
        });
        if changed {
            self.inner.listeners.notify();
        }
        changed
    }
}

impl<T: Send + Sync + 'static> Observable<T> {
    /// Change-tracking handle used to wire this observable into a
    /// [`Computed`](super::Computed).
    pub fn dependency(&self) -> Dependency {
        Dependency {
            source: Box::new(self.subscribe()),
            listeners: Arc::clone(&self.inner.listeners),
        }
    }
}

trait ChangeSource: Send + Sync {
    fn is_stale(&self) -> bool;
    fn acknowledge(&mut self);
}

impl<T: Send + Sync> ChangeSource for watch::Receiver<T> {
    fn is_stale(&self) -> bool {
        // A closed channel can no longer change.
        self.has_changed().unwrap_or(false)
    }

    fn acknowledge(&mut self) {
        let _ = self.borrow_and_update();
    }
}

/// Type-erased change tracker for one observable.
pub struct Dependency {
    source: Box<dyn ChangeSource>,
    listeners: Arc<Listeners>,
}

impl Dependency {
    /// Whether the source changed since the last [`mark_seen`](Self::mark_seen).
    pub fn has_changed(&self) -> bool {
        self.source.is_stale()
    }

    /// Acknowledge the source's current value.
    pub fn mark_seen(&mut self) {
        self.source.acknowledge();
    }

    /// Run `listener` after every mutation of the source, for as long as
    /// a strong handle to it exists.
    pub(crate) fn on_change(&self, listener: &ChangeListener) {
        self.listeners.register(listener);
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("changed", &self.has_changed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let cell = Observable::new(1);
        assert_eq!(cell.get(), 1);
        assert_eq!(cell.version(), 0);

        cell.set(2);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn test_clone_shares_value() {
        let a = Observable::new(String::from("x"));
        let b = a.clone();
        b.set("y".to_string());
        assert_eq!(a.get(), "y");
        assert_eq!(a.version(), 1);
    }

    #[test]
    fn test_update_in_place() {
        let list = Observable::new(vec![1, 2]);
        list.update(|v| v.push(3));
        assert_eq!(list.with(|v| v.len()), 3);
        assert_eq!(list.version(), 1);
    }

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let cell = Observable::new(5);
        assert!(!cell.set_if_changed(5));
        assert_eq!(cell.version(), 0);
        assert!(cell.set_if_changed(6));
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn test_dependency_tracks_changes() {
        let cell = Observable::new(0);
        let mut dep = cell.dependency();
        assert!(!dep.has_changed());

        cell.set(1);
        assert!(dep.has_changed());

        dep.mark_seen();
        assert!(!dep.has_changed());
    }

    #[tokio::test]
    async fn test_subscriber_sees_mutation() {
        let cell = Observable::new(false);
        let mut rx = cell.subscribe();

        let writer = cell.clone();
        tokio::spawn(async move {
            writer.set(true);
        });

        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[test]
    fn test_listener_runs_after_mutation() {
        use std::sync::atomic::AtomicU32;

        let cell = Observable::new(0);
        let seen = Arc::new(AtomicU32::new(0));
        let latest = Arc::clone(&seen);
        let reader = cell.clone();
        let listener: ChangeListener = Arc::new(move || {
            // The new value is already visible to listeners.
            latest.store(reader.get(), Ordering::SeqCst);
        });
        cell.dependency().on_change(&listener);
        assert_eq!(cell.listener_count(), 1);

        cell.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert!(!cell.set_if_changed(7));

        drop(listener);
        assert_eq!(cell.listener_count(), 0);
        cell.set(9);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_subscriber_count() {
        let cell = Observable::new(0);
        assert_eq!(cell.subscriber_count(), 0);
        let rx = cell.subscribe();
        assert_eq!(cell.subscriber_count(), 1);
        drop(rx);
        assert_eq!(cell.subscriber_count(), 0);
    }
}
