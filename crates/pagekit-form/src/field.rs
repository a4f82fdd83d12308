//! Field entries and the per-field rule.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagekit_core::error::AppError;
use pagekit_core::result::AppResult;

use crate::pattern::Pattern;

/// One form field: its current value and an optional pattern.
///
/// With a pattern, the field is valid if the pattern matches somewhere in
/// `value`. Without one, the field is valid if `value` is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Label used in reports. Does not affect validity.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Current input.
    pub value: String,
    /// Custom rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg: Option<Pattern>,
}

impl FieldEntry {
    /// Field checked by the non-blank rule.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
            reg: None,
        }
    }

    /// Field checked by `pattern`.
    pub fn with_pattern(value: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            reg: Some(pattern),
            ..Self::new(value)
        }
    }

    /// Set the report label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the current value satisfies this field's rule.
    pub fn is_valid(&self) -> bool {
        match &self.reg {
            Some(pattern) => pattern.is_match(&self.value),
            None => !self.value.trim().is_empty(),
        }
    }
}

/// Whether every field passes. Stops at the first failure; an empty list
/// is valid.
pub fn is_form_valid(fields: &[FieldEntry]) -> bool {
    fields.iter().all(FieldEntry::is_valid)
}

/// Index of the first failing field, if any.
pub fn first_invalid(fields: &[FieldEntry]) -> Option<usize> {
    fields.iter().position(|field| !field.is_valid())
}

/// Parse a JSON array of field descriptors.
///
/// Each element is an object with a string `value`, an optional `reg`
/// pattern (bare or `/source/flags`), and an optional `name`.
pub fn parse_fields(value: &Value) -> AppResult<Vec<FieldEntry>> {
    let Value::Array(items) = value else {
        return Err(AppError::validation("Field list must be a JSON array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            FieldEntry::deserialize(item).map_err(|e| {
                AppError::validation(format!("Invalid field entry at index {index}: {e}"))
            })
        })
        .collect()
}
