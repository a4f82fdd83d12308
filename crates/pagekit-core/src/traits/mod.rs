//! Trait definitions for pluggable PageKit backends.

pub mod credential;

pub use credential::CredentialStore;
