//! Credential store trait for bearer-token lookup.

/// Read-only key/value lookup for request credentials.
///
/// The request layer consults the store once per request and never writes
/// back. Acquiring or refreshing tokens is the embedding application's job.
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get the credential stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}
