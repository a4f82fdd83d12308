//! HTTP client configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// HTTP client configuration.
///
/// `base_url` is fixed once a client is built from this struct; request
/// paths are appended to it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a client configuration with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Reject configurations that cannot produce a request URL.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::configuration("client.base_url must not be empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "client.timeout_seconds must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Join the base URL and a request path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("pagekit/{}", env!("CARGO_PKG_VERSION"))
}
