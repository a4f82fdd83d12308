//! # PageKit
//!
//! Client-side state primitives for web front-ends:
//!
//! - [`RequestClient::issue_request`] runs one HTTP request and exposes its
//!   progress as observable `data` / `is_loading` / `err` cells.
//! - [`derive_validity`] turns an observable list of form fields into a
//!   derived validity flag.
//!
//! Both are built on the [`Observable`] / [`Computed`] cells re-exported
//! from `pagekit-core`.
//!
//! ```no_run
//! use pagekit::{AppConfig, RequestClient};
//!
//! # async fn run() -> pagekit::AppResult<()> {
//! let config = AppConfig::load("config/default.toml")?;
//! let client = RequestClient::from_config(&config)?;
//!
//! let outcome = client.get::<serde_json::Value>("/profile");
//! outcome.settled().await;
//! println!("{:?}", outcome.snapshot());
//! # Ok(())
//! # }
//! ```

pub use pagekit_core::config::AppConfig;
pub use pagekit_core::config::client::ClientConfig;
pub use pagekit_core::error::{AppError, ErrorKind};
pub use pagekit_core::reactive::{Computed, Observable};
pub use pagekit_core::result::AppResult;
pub use pagekit_core::traits::CredentialStore;

pub use pagekit_form::{
    FieldEntry, Pattern, derive_validity, derive_validity_from_json, first_invalid,
    is_form_valid, parse_fields,
};

pub use pagekit_request::{
    Envelope, FailureKind, FileCredentialStore, HttpTransport, MemoryCredentialStore,
    OutcomeSnapshot, RequestClient, RequestFailure, RequestOptions, RequestOutcome,
    ReqwestTransport, UNKNOWN_ERROR_MESSAGE, header, Method,
};

