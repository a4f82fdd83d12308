//! # pagekit-core
//!
//! Core crate for PageKit. Contains configuration schemas, the reactive
//! substrate (observable cells and derived values), the credential store
//! trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PageKit crates.

pub mod config;
pub mod error;
pub mod reactive;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use reactive::{Computed, Observable};
pub use result::AppResult;
