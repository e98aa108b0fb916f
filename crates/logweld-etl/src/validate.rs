//! Schema and business-rule validation.
//!
//! [`SchemaValidator::validate_schema`] checks a record collection against
//! the declarative schema for its dataset and produces a structured
//! [`ValidationResult`]. Results accumulate in an ordered history that the
//! report generator summarizes at the end of the run.
//!
//! The severity split is deliberate: a missing required field or an
//! unparseable datetime fails the dataset; type drift, out-of-enumeration
//! values, and nulls are warnings only.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use logweld_core::record::is_null_or_absent;
use logweld_core::{Dataset, FieldType, Record, SchemaSet};

use crate::timestamp;

/// Outcome of validating one dataset against its schema.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub data_type: Dataset,
    pub total_records: usize,
    pub validated_at: DateTime<Utc>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: bool,
}

/// Outcome of the independent business-rule checks.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessRulesResult {
    pub passed: bool,
    pub rules_checked: Vec<String>,
    pub violations: Vec<String>,
}

/// Validates record collections and keeps an ordered result history.
pub struct SchemaValidator {
    schemas: SchemaSet,
    history: Vec<ValidationResult>,
}

impl SchemaValidator {
    #[must_use]
    pub fn new(schemas: SchemaSet) -> Self {
        SchemaValidator {
            schemas,
            history: Vec::new(),
        }
    }

    /// Ordered history of every validation run so far.
    #[must_use]
    pub fn history(&self) -> &[ValidationResult] {
        &self.history
    }

    /// Validates `records` against the schema for `dataset`.
    ///
    /// Appends the result to the internal history and returns a copy.
    pub fn validate_schema(&mut self, records: &[Record], dataset: Dataset) -> ValidationResult {
        let schema = self.schemas.for_dataset(dataset);
        let field_set = union_of_fields(records);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for field in &schema.required_fields {
            if !field_set.contains(field.as_str()) {
                errors.push(format!("Missing required field: {field}"));
            }
        }

        for (field, expected) in &schema.field_types {
            if !field_set.contains(field.as_str()) {
                continue;
            }
            match expected {
                FieldType::Datetime => {
                    let unparseable = records
                        .iter()
                        .filter_map(|r| r.get(field))
                        .filter(|v| !v.is_null())
                        .any(|v| timestamp::parse_value(v).is_none());
                    if unparseable {
                        errors.push(format!("Field {field} should be datetime format"));
                    }
                }
                _ => {
                    let mismatch = records
                        .iter()
                        .filter_map(|r| r.get(field))
                        .filter(|v| !v.is_null())
                        .any(|v| !matches_type(v, *expected));
                    if mismatch {
                        warnings.push(format!("Field {field} should be {expected:?} type"));
                    }
                }
            }
        }

        for (field, allowed) in &schema.valid_values {
            if !field_set.contains(field.as_str()) {
                continue;
            }
            let mut invalid: Vec<&Value> = Vec::new();
            for value in records.iter().filter_map(|r| r.get(field)) {
                if value.is_null() {
                    continue;
                }
                if !allowed.contains(value) && !invalid.contains(&value) {
                    invalid.push(value);
                }
            }
            if !invalid.is_empty() {
                let rendered: Vec<String> = invalid.iter().map(|v| v.to_string()).collect();
                warnings.push(format!(
                    "Invalid {field} values found: [{}]",
                    rendered.join(", ")
                ));
            }
        }

        for field in &schema.required_fields {
            if !field_set.contains(field.as_str()) {
                continue;
            }
            let missing = records
                .iter()
                .filter(|r| is_null_or_absent(r, field))
                .count();
            if missing > 0 {
                warnings.push(format!("Field {field} has {missing} missing values"));
            }
        }

        let result = ValidationResult {
            data_type: dataset,
            total_records: records.len(),
            validated_at: Utc::now(),
            passed: errors.is_empty(),
            errors,
            warnings,
        };
        tracing::info!(
            dataset = %dataset,
            records = result.total_records,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            passed = result.passed,
            "schema validation finished"
        );
        self.history.push(result.clone());
        result
    }
}

/// Checks the three business invariants on a record collection.
///
/// Rules whose field is absent from the collection are skipped entirely, not
/// reported. Each violated rule contributes one count-bearing message.
#[must_use]
pub fn validate_business_rules(records: &[Record]) -> BusinessRulesResult {
    let field_set = union_of_fields(records);
    let mut rules_checked = Vec::new();
    let mut violations = Vec::new();

    if field_set.contains("response_time") {
        rules_checked.push("response_time_non_negative".to_owned());
        let negative = records
            .iter()
            .filter(|r| {
                r.get("response_time")
                    .and_then(Value::as_f64)
                    .is_some_and(|t| t < 0.0)
            })
            .count();
        if negative > 0 {
            violations.push(format!(
                "Found {negative} records with negative response time"
            ));
        }
    }

    if field_set.contains("status_code") {
        rules_checked.push("status_code_range".to_owned());
        let out_of_range = records
            .iter()
            .filter(|r| {
                r.get("status_code")
                    .and_then(Value::as_i64)
                    .is_some_and(|code| !(100..=599).contains(&code))
            })
            .count();
        if out_of_range > 0 {
            violations.push(format!(
                "Found {out_of_range} records with invalid status codes"
            ));
        }
    }

    if field_set.contains("user_id") {
        rules_checked.push("user_id_not_empty".to_owned());
        let empty = records
            .iter()
            .filter(|r| match r.get("user_id") {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .count();
        if empty > 0 {
            violations.push(format!("Found {empty} records with empty user_id"));
        }
    }

    BusinessRulesResult {
        passed: violations.is_empty(),
        rules_checked,
        violations,
    }
}

/// Union of field names across every record, pandas-column style.
fn union_of_fields(records: &[Record]) -> BTreeSet<&str> {
    records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect()
}

fn matches_type(value: &Value, expected: FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Float => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        // Handled separately; datetime failures are errors, not warnings.
        FieldType::Datetime => true,
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;
