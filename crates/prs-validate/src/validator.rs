//! Contract validation.
//!
//! Validation is exhaustive, not fail-fast: every violation across the
//! whole table is collected before any routing decision, so a quarantine
//! log reports every problem at once.

use std::collections::HashMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::debug;

use prs_model::{FieldType, SchemaContract, Violation, ViolationKind};

use crate::coerce::{parse_boolean, parse_date_iso, parse_number};

/// Outcome of validating one transformed table.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// The table conforms; typed columns are coerced to their declared types.
    Valid(DataFrame),
    /// The table does not conform; the input is left untouched.
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }
}

/// Validator for the canonical schema contract.
pub struct Validator<'a> {
    contract: &'a SchemaContract,
}

fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn cell_string(df: &DataFrame, column: &str, idx: usize) -> String {
    match df.column(column) {
        Ok(series) => any_to_string(series.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

impl<'a> Validator<'a> {
    pub fn new(contract: &'a SchemaContract) -> Self {
        Self { contract }
    }

    /// Validate a table against the contract.
    ///
    /// Returns `Valid` wrapping a frame whose contract columns are coerced
    /// to their declared types, or `Invalid` with every violation found.
    pub fn validate(&self, df: &DataFrame) -> ValidationResult {
        let columns: HashMap<String, String> = df
            .get_column_names()
            .iter()
            .map(|name| (name.to_lowercase(), name.to_string()))
            .collect();
        let height = df.height();
        let mut violations: Vec<Violation> = Vec::new();

        for field in self.contract.required_fields() {
            if !columns.contains_key(&field.name.to_lowercase()) {
                violations.push(Violation {
                    kind: ViolationKind::MissingRequiredField,
                    field: field.name.clone(),
                    row: None,
                    message: format!("required column {} not found", field.name),
                });
            }
        }

        for field in &self.contract.fields {
            let Some(column) = columns.get(&field.name.to_lowercase()) else {
                continue;
            };
            for idx in 0..height {
                let value = cell_string(df, column, idx);
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    if field.required {
                        violations.push(Violation {
                            kind: ViolationKind::NullInRequiredField,
                            field: field.name.clone(),
                            row: Some(idx),
                            message: format!(
                                "required column {} is empty at row {idx}",
                                field.name
                            ),
                        });
                    }
                    continue;
                }
                let ok = match field.field_type {
                    FieldType::Text => true,
                    FieldType::Number => parse_number(trimmed).is_some(),
                    FieldType::Date => parse_date_iso(trimmed).is_some(),
                    FieldType::Boolean => parse_boolean(trimmed).is_some(),
                };
                if !ok {
                    violations.push(Violation {
                        kind: ViolationKind::TypeMismatch,
                        field: field.name.clone(),
                        row: Some(idx),
                        message: format!(
                            "value {trimmed:?} in column {} at row {idx} is not a {}",
                            field.name, field.field_type
                        ),
                    });
                }
            }
        }

        if !violations.is_empty() {
            debug!(violations = violations.len(), "validation failed");
            return ValidationResult::Invalid(violations);
        }

        match self.coerce(df) {
            Ok(coerced) => ValidationResult::Valid(coerced),
            Err(violation) => ValidationResult::Invalid(vec![violation]),
        }
    }

    /// Build the typed frame. Only called once the table is known clean,
    /// so any residual parse failure would be a logic error; it is still
    /// reported as a violation rather than panicking.
    fn coerce(&self, df: &DataFrame) -> Result<DataFrame, Violation> {
        let height = df.height();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            let field = self.contract.field(name);
            let column = match field.map(|f| f.field_type) {
                Some(FieldType::Number) => {
                    let values: Vec<Option<f64>> = (0..height)
                        .map(|idx| parse_number(&cell_string(df, name, idx)))
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                }
                Some(FieldType::Boolean) => {
                    let values: Vec<Option<bool>> = (0..height)
                        .map(|idx| parse_boolean(&cell_string(df, name, idx)))
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                }
                Some(FieldType::Date) => {
                    let values: Vec<String> = (0..height)
                        .map(|idx| {
                            parse_date_iso(&cell_string(df, name, idx)).unwrap_or_default()
                        })
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                }
                Some(FieldType::Text) => {
                    let values: Vec<String> = (0..height)
                        .map(|idx| cell_string(df, name, idx).trim().to_string())
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                }
                None => match df.column(name) {
                    Ok(column) => column.clone(),
                    Err(_) => {
                        return Err(Violation {
                            kind: ViolationKind::TypeMismatch,
                            field: name.clone(),
                            row: None,
                            message: format!("column {name} disappeared during coercion"),
                        });
                    }
                },
            };
            columns.push(column);
        }
        DataFrame::new(columns).map_err(|error| Violation {
            kind: ViolationKind::TypeMismatch,
            field: String::new(),
            row: None,
            message: format!("failed to assemble coerced frame: {error}"),
        })
    }
}
