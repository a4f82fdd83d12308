//! Observable state of one request.

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

use pagekit_core::reactive::Observable;

use crate::error::{FailureKind, RequestFailure};

/// The observable `data` / `is_loading` / `err` triple of one request.
///
/// Handed back by [`RequestClient::issue_request`](crate::RequestClient::issue_request)
/// before the request completes. The request task is the only writer:
///
/// - `is_loading` starts `true` and flips to `false` exactly once;
/// - on success `data` is set first, then `is_loading`;
/// - on failure `kind` and `err` are set first, then `is_loading`.
///
/// So once `is_loading` reads `false`, exactly one of `data` / `err` is
/// populated. Cloning produces another handle to the same cells.
pub struct RequestOutcome<T> {
    data: Observable<Option<T>>,
    is_loading: Observable<bool>,
    err: Observable<String>,
    kind: Observable<Option<FailureKind>>,
}

impl<T> Clone for RequestOutcome<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading.clone(),
            err: self.err.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RequestOutcome<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOutcome")
            .field("data", &self.data)
            .field("is_loading", &self.is_loading)
            .field("err", &self.err)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Plain copy of an outcome's cells at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSnapshot<T> {
    /// Payload, present only after success.
    pub data: Option<T>,
    /// Whether the request is still in flight.
    pub is_loading: bool,
    /// Error text, empty unless the request failed.
    pub err: String,
    /// Failure category, present only after failure.
    pub kind: Option<FailureKind>,
}

impl<T> OutcomeSnapshot<T> {
    /// Whether this snapshot shows a completed, successful request.
    pub fn is_success(&self) -> bool {
        !self.is_loading && self.data.is_some()
    }
}

impl<T> RequestOutcome<T> {
    /// Fresh in-flight outcome.
    pub(crate) fn pending() -> Self {
        Self {
            data: Observable::new(None),
            is_loading: Observable::new(true),
            err: Observable::new(String::new()),
            kind: Observable::new(None),
        }
    }

    /// Payload cell.
    pub fn data(&self) -> &Observable<Option<T>> {
        &self.data
    }

    /// Loading-flag cell.
    pub fn is_loading(&self) -> &Observable<bool> {
        &self.is_loading
    }

    /// Error-text cell.
    pub fn err(&self) -> &Observable<String> {
        &self.err
    }

    /// Failure-category cell.
    pub fn kind(&self) -> &Observable<Option<FailureKind>> {
        &self.kind
    }

    /// Receiver notified when the payload is published.
    pub fn subscribe_data(&self) -> watch::Receiver<Option<T>> {
        self.data.subscribe()
    }

    /// Receiver notified when the request settles.
    pub fn subscribe_is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    /// Receiver notified when error text is published.
    pub fn subscribe_err(&self) -> watch::Receiver<String> {
        self.err.subscribe()
    }

    /// Whether the request has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        !self.is_loading.with(|loading| *loading)
    }

    /// Wait until the request completes.
    ///
    /// Returns immediately if it already has.
    pub async fn settled(&self) {
        let mut rx = self.is_loading.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|loading| !*loading).await;
    }

    /// Apply the request result. Ignored if the outcome already settled.
    pub(crate) fn settle(&self, result: Result<T, RequestFailure>) {
        if self.is_settled() {
            warn!("Ignoring second completion of an already settled request");
            return;
        }
        match result {
            Ok(value) => {
                self.data.set(Some(value));
                self.is_loading.set(false);
            }
            Err(failure) => {
                self.kind.set(Some(failure.kind));
                self.err.set(failure.message);
                self.is_loading.set(false);
            }
        }
    }
}

impl<T: Clone> RequestOutcome<T> {
    /// Copy every cell.
    ///
    /// Cells are read in publication-reverse order (`is_loading` first), so
    /// a snapshot that shows `is_loading == false` always carries the final
    /// `data` or `err`.
    pub fn snapshot(&self) -> OutcomeSnapshot<T> {
        let is_loading = self.is_loading.get();
        OutcomeSnapshot {
            data: self.data.get(),
            is_loading,
            err: self.err.get(),
            kind: self.kind.get(),
        }
    }
}
