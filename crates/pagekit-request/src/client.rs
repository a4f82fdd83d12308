//! Request issuing and state projection.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tracing::{Instrument, debug, info_span, warn};

use pagekit_core::config::AppConfig;
use pagekit_core::config::client::ClientConfig;
use pagekit_core::result::AppResult;
use pagekit_core::traits::credential::CredentialStore;

use crate::credential::credential_store_from_config;
use crate::envelope::decode_envelope;
use crate::error::RequestFailure;
use crate::options::RequestOptions;
use crate::outcome::RequestOutcome;
use crate::transport::{HttpTransport, PreparedRequest, ReqwestTransport};

/// Credential key used when none is configured.
pub const DEFAULT_CREDENTIAL_KEY: &str = "token";

/// Issues requests against one base URL and projects each result onto a
/// [`RequestOutcome`].
///
/// Cheap to clone; clones share the transport and credential store.
#[derive(Debug, Clone)]
pub struct RequestClient {
    /// Base URL and transport settings.
    config: Arc<ClientConfig>,
    /// Credential store key of the bearer token.
    credential_key: Arc<str>,
    /// Sends prepared requests.
    transport: Arc<dyn HttpTransport>,
    /// Supplies the bearer token.
    credentials: Arc<dyn CredentialStore>,
}

impl RequestClient {
    /// Creates a client from explicit parts.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credential_key: Arc::from(DEFAULT_CREDENTIAL_KEY),
            transport,
            credentials,
        }
    }

    /// Creates a client with the reqwest transport and the configured
    /// credential store.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.client.validate()?;
        let transport = ReqwestTransport::new(&config.client)?;
        let credentials = credential_store_from_config(&config.credentials);
        Ok(Self::new(config.client.clone(), Arc::new(transport), credentials)
            .with_credential_key(config.credentials.key.as_str()))
    }

    /// Looks the bearer token up under `key` instead of the default.
    pub fn with_credential_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.credential_key = key.into();
        self
    }

    /// Base URL request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Issues one request and returns its outcome immediately.
    ///
    /// The returned outcome is loading; the request runs on the current
    /// Tokio runtime and settles the outcome exactly once. `options`
    /// defaults to a JSON `GET`. With `credential_required`, the stored
    /// bearer token replaces any `Authorization` header in `options`.
    ///
    /// Called outside a runtime, the outcome settles at once as an unknown
    /// failure.
    pub fn issue_request<T>(
        &self,
        path: &str,
        options: Option<RequestOptions>,
        credential_required: bool,
    ) -> RequestOutcome<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let outcome = RequestOutcome::pending();
        let options = options.unwrap_or_default();

        let mut headers = options.headers;
        if credential_required {
            self.apply_credential(&mut headers);
        }

        let request = PreparedRequest {
            method: options.method,
            url: self.config.url_for(path),
            headers,
            body: options.body,
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot issue request to {} outside a runtime", request.url);
                outcome.settle(Err(RequestFailure::unknown(format!(
                    "No async runtime: {e}"
                ))));
                return outcome;
            }
        };

        let span = info_span!("request", method = %request.method, url = %request.url);
        let transport = Arc::clone(&self.transport);
        let writer = outcome.clone();
        handle.spawn(
            async move {
                debug!("Sending request");
                let result = execute(transport.as_ref(), request).await;
                match &result {
                    Ok(_) => debug!("Request succeeded"),
                    Err(failure) => warn!(
                        kind = %failure.kind,
                        detail = ?failure.detail,
                        "Request failed: {}",
                        failure.message
                    ),
                }
                writer.settle(result);
            }
            .instrument(span),
        );

        outcome
    }

    /// `GET path` with the bearer credential.
    pub fn get<T>(&self, path: &str) -> RequestOutcome<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.issue_request(path, None, true)
    }

    /// `POST path` with a JSON body and the bearer credential.
    ///
    /// A body that cannot be serialized settles the outcome as an unknown
    /// failure without sending anything.
    pub fn post_json<T, B>(&self, path: &str, body: &B) -> RequestOutcome<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
        B: Serialize + ?Sized,
    {
        match RequestOptions::new(Method::POST).json(body) {
            Ok(options) => self.issue_request(path, Some(options), true),
            Err(e) => {
                warn!("Failed to serialize request body for {}: {}", path, e);
                let outcome = RequestOutcome::pending();
                outcome.settle(Err(RequestFailure::unknown(e.to_string())));
                outcome
            }
        }
    }

    fn apply_credential(&self, headers: &mut HeaderMap) {
        let Some(token) = self.credentials.get(&self.credential_key) else {
            warn!(
                "No credential stored under '{}', sending request without Authorization",
                self.credential_key
            );
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(
                "Credential '{}' is not a valid header value: {}",
                self.credential_key, e
            ),
        }
    }
}

/// Send, check the status, and unwrap the envelope.
async fn execute<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    request: PreparedRequest,
) -> Result<T, RequestFailure> {
    let response = transport.send(request).await?;
    if !response.status.is_success() {
        return Err(RequestFailure::http_status(response.status));
    }
    decode_envelope(&response.body)
}
