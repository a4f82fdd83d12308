//! # pagekit-form
//!
//! Form validation over observable field lists.
//!
//! Each [`FieldEntry`] carries a value and an optional [`Pattern`]. A field
//! with a pattern is valid when the pattern matches somewhere in the value;
//! a field without one is valid when the value is not blank.
//! [`derive_validity`] turns an observable field list into a derived
//! boolean that stays current as the list changes.

pub mod field;
pub mod pattern;
pub mod validity;

pub use field::{FieldEntry, first_invalid, is_form_valid, parse_fields};
pub use pattern::Pattern;
pub use validity::{derive_validity, derive_validity_from_json};
