//! Per-request method, headers, and body.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use pagekit_core::error::AppError;
use pagekit_core::result::AppResult;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Method, headers, and optional body for one request.
///
/// `Default` is a `GET` with `Content-Type: application/json`. Options built
/// with [`RequestOptions::new`] start with no headers, so callers that pass
/// their own options get exactly the headers they set.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Option<Bytes>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Self {
            method: Method::GET,
            headers,
            body: None,
        }
    }
}

impl RequestOptions {
    /// Options for `method` with no headers and no body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header from untrusted strings.
    pub fn try_header(self, name: &str, value: &str) -> AppResult<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::validation(format!("Invalid header name ({name}): {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| AppError::validation(format!("Invalid header value for {name}: {e}")))?;
        Ok(self.header(header_name, header_value))
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON and set the JSON content type.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> AppResult<Self> {
        let encoded = serde_json::to_vec(body)?;
        Ok(self
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .body(encoded))
    }
}
