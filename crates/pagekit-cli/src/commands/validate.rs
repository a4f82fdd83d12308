//! Form validation command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pagekit_core::error::{AppError, ErrorKind};
use pagekit_core::reactive::Observable;
use pagekit_form::{FieldEntry, derive_validity, first_invalid, parse_fields};

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON file holding an array of `{ name?, value, reg? }` entries
    pub file: PathBuf,
}

/// Field display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    /// Position in the list
    index: usize,
    /// Field label
    name: String,
    /// Current value
    value: String,
    /// Rule applied
    rule: String,
    /// Whether the field passes
    valid: bool,
}

impl FieldRow {
    fn new(index: usize, field: &FieldEntry) -> Self {
        Self {
            index,
            name: field.name.clone(),
            value: field.value.clone(),
            rule: field
                .reg
                .as_ref()
                .map(|pattern| pattern.to_string())
                .unwrap_or_else(|| "non-blank".to_string()),
            valid: field.is_valid(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_invalid: Option<usize>,
    fields: Vec<FieldRow>,
}

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, format: OutputFormat) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(&args.file).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to read '{}': {e}", args.file.display()),
            e,
        )
    })?;
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    let fields = parse_fields(&json)?;

    let report = evaluate(fields);

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_table(&report.fields);
            if report.valid {
                output::print_success("All fields are valid");
            }
        }
    }

    if report.valid {
        return Ok(());
    }
    let failing = report
        .first_invalid
        .and_then(|index| report.fields.get(index))
        .map(describe)
        .unwrap_or_default();
    output::print_error(&format!("Form is invalid: {failing}"));
    Err(AppError::validation(format!("Form is invalid: {failing}")))
}

fn evaluate(fields: Vec<FieldEntry>) -> ValidationReport {
    let rows = fields
        .iter()
        .enumerate()
        .map(|(index, field)| FieldRow::new(index, field))
        .collect();
    let first_invalid = first_invalid(&fields);

    let valid = derive_validity(&Observable::new(fields)).get();
    ValidationReport {
        valid,
        first_invalid,
        fields: rows,
    }
}

fn describe(row: &FieldRow) -> String {
    if row.name.is_empty() {
        format!("field {} fails {}", row.index, row.rule)
    } else {
        format!("field '{}' fails {}", row.name, row.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fields(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        file
    }

    #[tokio::test]
    async fn test_valid_form() {
        let file = write_fields(r#"[{ "name": "age", "value": "42", "reg": "^\\d+$" }]"#);
        let args = ValidateArgs {
            file: file.path().to_path_buf(),
        };
        assert!(execute(&args, OutputFormat::Json).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_form_names_first_failure() {
        let file = write_fields(r#"[{ "value": "ok" }, { "name": "email", "value": "  " }]"#);
        let args = ValidateArgs {
            file: file.path().to_path_buf(),
        };
        let err = execute(&args, OutputFormat::Table).await.unwrap_err();
        assert!(err.message.contains("'email'"));
        assert!(err.message.contains("non-blank"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let args = ValidateArgs {
            file: PathBuf::from("/nonexistent/fields.json"),
        };
        let err = execute(&args, OutputFormat::Json).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_evaluate_empty_list() {
        let report = evaluate(Vec::new());
        assert!(report.valid);
        assert!(report.fields.is_empty());
        assert_eq!(report.first_invalid, None);
    }
}
