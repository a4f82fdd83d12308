//! HTTP transport abstraction and the reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

use pagekit_core::config::client::ClientConfig;
use pagekit_core::error::AppError;
use pagekit_core::result::AppResult;

use crate::error::RequestFailure;

/// A fully resolved request, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL (`base_url + path`).
    pub url: String,
    /// Final headers, including any injected credential.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Option<Bytes>,
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Full response body.
    pub body: Bytes,
}

/// Sends one request and reads the whole response.
///
/// Implementations report only transport-level problems as errors; status
/// codes are interpreted by the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Send the request and collect the response body.
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, RequestFailure>;
}

/// Production transport built on a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeouts and user agent.
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            AppError::configuration(format!("Invalid user agent '{}': {e}", config.user_agent))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, RequestFailure> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            debug!("HTTP request failed for {}: {}", request.url, e);
            RequestFailure::transport(format!("Request to {} failed: {e}", request.url))
        })?;

        let status = response.status();
        debug!("Received HTTP status {} for {}", status, request.url);

        let body = response.bytes().await.map_err(|e| {
            RequestFailure::transport(format!(
                "Failed to read response body from {}: {e}",
                request.url
            ))
        })?;

        Ok(TransportResponse { status, body })
    }
}
