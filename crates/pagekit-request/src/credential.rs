//! Credential store implementations.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use pagekit_core::config::credentials::{CredentialConfig, CredentialProvider};
use pagekit_core::traits::credential::CredentialStore;

/// Process-local credential map.
///
/// The embedding application writes tokens here after login; the request
/// layer only reads. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Store a credential, replacing any previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a credential.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, value)| value)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

/// Credentials persisted as a flat JSON object, e.g. `{"token": "abc"}`.
///
/// The file is read on every lookup so tokens written by another process
/// are picked up without a restart. Non-string values are ignored.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Credential file {} does not exist", self.path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    "Failed to read credential file {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        let entries: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw)
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Credential file {} is not a JSON object: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match entries.get(key) {
            Some(serde_json::Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Build the credential store selected by configuration.
pub fn credential_store_from_config(config: &CredentialConfig) -> Arc<dyn CredentialStore> {
    match config.provider {
        CredentialProvider::Memory => Arc::new(MemoryCredentialStore::new()),
        CredentialProvider::File => Arc::new(FileCredentialStore::new(&config.file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new().with("token", "abc");
        assert_eq!(store.get("token"), Some("abc".to_string()));
        assert_eq!(store.get("other"), None);

        assert_eq!(store.remove("token"), Some("abc".to_string()));
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryCredentialStore::new();
        let handle = store.clone();
        handle.insert("token", "xyz");
        assert_eq!(store.get("token"), Some("xyz".to_string()));
    }

    #[test]
    fn test_file_store_reads_string_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "from-disk", "count": 3}}"#).unwrap();

        let store = FileCredentialStore::new(file.path());
        assert_eq!(store.get("token"), Some("from-disk".to_string()));
        assert_eq!(store.get("count"), None);
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_file_store_rereads_on_each_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);

        assert_eq!(store.get("token"), None);
        std::fs::write(&path, r#"{"token": "later"}"#).unwrap();
        assert_eq!(store.get("token"), Some("later".to_string()));
    }

    #[test]
    fn test_file_store_ignores_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert_eq!(FileCredentialStore::new(file.path()).get("token"), None);
    }

    #[test]
    fn test_store_from_config() {
        let config = CredentialConfig {
            provider: CredentialProvider::File,
            key: "token".to_string(),
            file: "/nonexistent/credentials.json".to_string(),
        };
        let store = credential_store_from_config(&config);
        assert_eq!(store.get("token"), None);
    }
}
