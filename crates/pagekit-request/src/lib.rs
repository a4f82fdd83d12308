//! # pagekit-request
//!
//! Issues a single HTTP request and projects its result onto three
//! observable cells: `data`, `is_loading`, and `err`.
//!
//! Responses must follow the `{ code, message, data }` envelope. A bearer
//! credential is injected from a [`CredentialStore`] unless the caller opts
//! out. Failures of any kind are materialized into the outcome instead of
//! being returned.

pub mod client;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod options;
pub mod outcome;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::RequestClient;
pub use credential::{FileCredentialStore, MemoryCredentialStore, credential_store_from_config};
pub use envelope::Envelope;
pub use error::{FailureKind, RequestFailure, UNKNOWN_ERROR_MESSAGE};
pub use options::RequestOptions;
pub use outcome::{OutcomeSnapshot, RequestOutcome};
pub use pagekit_core::traits::CredentialStore;
pub use reqwest::header;
pub use reqwest::{Method, StatusCode};
pub use transport::{HttpTransport, PreparedRequest, ReqwestTransport, TransportResponse};
