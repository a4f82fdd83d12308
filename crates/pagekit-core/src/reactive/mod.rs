//! Reactive value cells for UI bindings.
//!
//! - [`Observable`]: a shared, version-tracked value. Writers call
//!   [`set`](Observable::set) or [`update`](Observable::update); readers
//!   take snapshots or [`subscribe`](Observable::subscribe) to a
//!   `tokio::sync::watch` receiver and await changes.
//! - [`Computed`]: a memoized value derived from one or more observables.
//!   It recomputes on the writer's thread after any source changes and
//!   publishes the result through its own watch channel, so callers can
//!   [`subscribe`](Computed::subscribe) to it like an observable.
//!
//! # Invariants
//!
//! 1. An observable's version increments exactly once per mutation, while
//!    the new value is being published.
//! 2. `Computed::get()` never returns a value older than the latest
//!    completed mutation of any of its sources.
//! 3. A computed value's compute function runs at most once per source
//!    mutation, and never for a read with no intervening mutation.

pub mod computed;
pub mod observable;

pub use computed::Computed;
pub use observable::{Dependency, Observable};
