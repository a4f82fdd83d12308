//! Request failure taxonomy.
//!
//! Failures never leave the request task. They are projected onto the
//! outcome's `err` and `kind` cells.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Message used whenever a failure carries no usable text.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// Network failure, unreachable host, or unreadable response body.
    Transport,
    /// Response status outside the 2xx range.
    HttpStatus,
    /// Envelope `code` outside `[200, 300)`.
    Application,
    /// Anything else, such as a body that is not a valid envelope.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "TRANSPORT"),
            Self::HttpStatus => write!(f, "HTTP_STATUS"),
            Self::Application => write!(f, "APPLICATION"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A failed request: its category and the text shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RequestFailure {
    /// The category of failure.
    pub kind: FailureKind,
    /// Caller-facing message; never empty.
    pub message: String,
    /// Diagnostic detail that is logged but not surfaced.
    pub detail: Option<String>,
}

impl RequestFailure {
    /// Create a failure, substituting [`UNKNOWN_ERROR_MESSAGE`] for empty text.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            detail: None,
        }
    }

    /// Create a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    /// Create a failure for a non-success HTTP status.
    pub fn http_status(status: StatusCode) -> Self {
        Self::new(
            FailureKind::HttpStatus,
            format!("HTTP error! status: {}", status.as_u16()),
        )
    }

    /// Create an application failure from the envelope message, if any.
    pub fn application(message: Option<String>) -> Self {
        Self::new(FailureKind::Application, message.unwrap_or_default())
    }

    /// Create an unknown failure. The caller sees only the fixed message.
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unknown,
            message: UNKNOWN_ERROR_MESSAGE.to_string(),
            detail: Some(detail.into()),
        }
    }
}
