//! Credential store configuration.

use serde::{Deserialize, Serialize};

/// Which backend holds the bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialProvider {
    /// Process-local map populated by the embedding application.
    #[default]
    Memory,
    /// JSON object on disk, read on every lookup.
    File,
}

/// Credential store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Backend type.
    #[serde(default)]
    pub provider: CredentialProvider,
    /// Key under which the bearer token is stored.
    #[serde(default = "default_key")]
    pub key: String,
    /// Path of the JSON credential file (file provider only).
    #[serde(default = "default_file")]
    pub file: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            provider: CredentialProvider::default(),
            key: default_key(),
            file: default_file(),
        }
    }
}

fn default_key() -> String {
    "token".to_string()
}

fn default_file() -> String {
    "data/credentials.json".to_string()
}
