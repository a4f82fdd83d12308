//! The `{ code, message, data }` response envelope.

use std::ops::Range;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RequestFailure;

/// Envelope codes that denote success.
pub const SUCCESS_CODES: Range<i64> = 200..300;

/// Shape every server response body must follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Application status code; `[200, 300)` is success.
    pub code: i64,
    /// Human-readable reason, used as the error text on failure.
    pub message: String,
    /// Payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data,
        }
    }
}

impl Envelope<serde_json::Value> {
    /// Failed envelope with a null payload.
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: serde_json::Value::Null,
        }
    }
}

/// First-stage parse: only `code` must be well-typed so that a failure
/// envelope with a null or mistyped payload still yields its message.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    code: i64,
    #[serde(default)]
    message: serde_json::Value,
    #[serde(default)]
    data: serde_json::Value,
}

/// Whether an envelope code denotes success.
pub fn is_success_code(code: i64) -> bool {
    SUCCESS_CODES.contains(&code)
}

/// Decode a response body and unwrap its payload.
///
/// - body is not an envelope → [`FailureKind::Unknown`](crate::FailureKind::Unknown)
/// - code outside `[200, 300)` → `Application` with the envelope message
/// - payload does not match `T` → `Unknown`
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestFailure> {
    let raw: RawEnvelope = serde_json::from_slice(body).map_err(|e| {
        warn!("Response body is not a valid envelope: {}", e);
        RequestFailure::unknown(format!("Invalid envelope: {e}"))
    })?;

    if !is_success_code(raw.code) {
        return Err(RequestFailure::application(message_text(raw.message)));
    }

    serde_json::from_value(raw.data).map_err(|e| {
        warn!("Envelope payload has an unexpected shape: {}", e);
        RequestFailure::unknown(format!("Invalid envelope payload: {e}"))
    })
}

fn message_text(message: serde_json::Value) -> Option<String> {
    match message {
        serde_json::Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}
