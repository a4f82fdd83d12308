//! Memoized values derived from [`Observable`] dependencies.
//!
//! # Design
//!
//! [`Computed<T>`] holds a compute function, one [`Dependency`] per source
//! and a `tokio::sync::watch` channel carrying the latest result. The
//! function runs once at construction and again on the writer's thread
//! after every mutation of a source, so subscribers see the new value
//! without anyone reading it first. Reads also check the sources, which
//! covers a mutation that raced with construction. Recomputation is
//! synchronous and never suspends.
//!
//! # Failure Modes
//!
//! - **Compute function panics**: the panic reaches whoever triggered the
//!   recomputation (the writer, or the reader). The value stays marked
//!   stale and the next read runs the function again.
//! - **Re-entrant access**: reading the same `Computed` from its own
//!   compute function, or writing one of its sources inside
//!   [`Computed::with`], deadlocks.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::trace;

use super::observable::{ChangeListener, Dependency, Observable};

type ComputeFn<T> = Box<dyn Fn() -> T + Send + Sync>;

struct ComputedInner<T> {
    compute: ComputeFn<T>,
    output: watch::Sender<T>,
    /// Bumped on each recomputation.
    version: u64,
    /// Set while a recomputation is in flight; survives a panic.
    pending: bool,
    dependencies: Vec<Dependency>,
    /// Registered weakly with every source; lives as long as this state.
    _on_change: ChangeListener,
}

impl<T> ComputedInner<T> {
    fn is_stale(&self) -> bool {
        self.pending || self.dependencies.iter().any(Dependency::has_changed)
    }

    fn refresh(&mut self) {
        if !self.is_stale() {
            return;
        }
        // Acknowledge first so a mutation racing with the computation is
        // picked up by the next refresh.
        for dependency in &mut self.dependencies {
            dependency.mark_seen();
        }
        self.pending = true;
        let value = (self.compute)();
        self.pending = false;
        self.version += 1;
        trace!(version = self.version, "Recomputed derived value");
        self.output.send_replace(value);
    }
}

fn lock<T>(inner: &Mutex<ComputedInner<T>>) -> MutexGuard<'_, ComputedInner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A memoized value derived from one or more [`Observable`]s.
///
/// Cloning a `Computed` creates a new handle to the **same** state. The
/// derivation stops once every handle is dropped.
pub struct Computed<T> {
    inner: Arc<Mutex<ComputedInner<T>>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Computed")
            .field("value", &*inner.output.borrow())
            .field("version", &inner.version)
            .finish()
    }
}

impl<T> Computed<T> {
    fn lock(&self) -> MutexGuard<'_, ComputedInner<T>> {
        lock(&self.inner)
    }
}

impl<T: Clone + Send + Sync + 'static> Computed<T> {
    /// Create a computed value derived from a single observable.
    pub fn from_observable<S>(
        source: &Observable<S>,
        map: impl Fn(&S) -> T + Send + Sync + 'static,
    ) -> Self
    where
        S: Send + Sync + 'static,
    {
        let source_clone = source.clone();
        Self::from_fn(move || source_clone.with(|v| map(v)), vec![source.dependency()])
    }

    /// Create a computed value derived from two observables.
    pub fn from2<S1, S2>(
        s1: &Observable<S1>,
        s2: &Observable<S2>,
        map: impl Fn(&S1, &S2) -> T + Send + Sync + 'static,
    ) -> Self
    where
        S1: Send + Sync + 'static,
        S2: Send + Sync + 'static,
    {
        let s1_clone = s1.clone();
        let s2_clone = s2.clone();
        Self::from_fn(
            move || s1_clone.with(|v1| s2_clone.with(|v2| map(v1, v2))),
            vec![s1.dependency(), s2.dependency()],
        )
    }

    /// Create a computed value from a compute function and explicit
    /// dependencies.
    ///
    /// The function runs immediately to seed the value.
    pub fn from_fn(
        compute: impl Fn() -> T + Send + Sync + 'static,
        mut dependencies: Vec<Dependency>,
    ) -> Self {
        for dependency in &mut dependencies {
            dependency.mark_seen();
        }
        let (output, _rx) = watch::channel(compute());

        let inner = Arc::new_cyclic(|weak: &Weak<Mutex<ComputedInner<T>>>| {
            let weak = weak.clone();
            let on_change: ChangeListener = Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).refresh();
                }
            });
            for dependency in &dependencies {
                dependency.on_change(&on_change);
            }
            Mutex::new(ComputedInner {
                compute: Box::new(compute),
                output,
                version: 1,
                pending: false,
                dependencies,
                _on_change: on_change,
            })
        });

        Self { inner }
    }

    /// Current value, recomputed first if a source changed unseen.
    #[must_use]
    pub fn get(&self) -> T {
        let mut inner = self.lock();
        inner.refresh();
        inner.output.borrow().clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let mut inner = self.lock();
        inner.refresh();
        let value = inner.output.borrow();
        f(&value)
    }

    /// Receiver notified after every recomputation.
    ///
    /// The current value is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        let mut inner = self.lock();
        inner.refresh();
        inner.output.subscribe()
    }

    /// Whether a source changed without a completed recomputation.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lock().is_stale()
    }

    /// Number of computations so far, including the initial one.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lock().version
    }
}
