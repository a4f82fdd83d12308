//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML via the `config`
//! crate, with `PAGEKIT_`-prefixed environment variables layered on top
//! (for example `PAGEKIT_CLIENT__BASE_URL`).

pub mod client;
pub mod credentials;
pub mod logging;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::client::ClientConfig;
use self::credentials::CredentialConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

const ENV_PREFIX: &str = "PAGEKIT";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP client settings, including the base URL.
    pub client: ClientConfig,
    /// Credential store settings.
    #[serde(default)]
    pub credentials: CredentialConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file (optional) and the environment.
    pub fn load(path: &str) -> Result<Self, AppError> {
        debug!(path, "Loading configuration");
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Build configuration from an in-memory TOML document.
    ///
    /// Environment overrides are not applied.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.client.validate()?;
        debug!(
            base_url = %parsed.client.base_url,
            credentials = ?parsed.credentials.provider,
            "Configuration loaded"
        );
        Ok(parsed)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
