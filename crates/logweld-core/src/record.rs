//! Dynamic record rows and field access helpers.
//!
//! Input logs are free-form NDJSON, so a row is an ordered JSON map rather
//! than a fixed struct. Typing lives at the edges: the schema validator
//! checks shapes once at the boundary, and API responses are deserialized
//! into typed structs before their fields are merged back into records.

use serde_json::Value;

/// One row of an input log, a joined row, or an enriched row.
///
/// `serde_json::Map` preserves insertion order, which keeps output files
/// stable and keeps enrichment columns grouped at the end of each row.
pub type Record = serde_json::Map<String, Value>;

/// Returns the field as `&str` when present and a string.
#[must_use]
pub fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Returns the field as `f64` when present and numeric.
#[must_use]
pub fn f64_field(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

/// Returns `true` when the field is absent or explicit JSON null.
#[must_use]
pub fn is_null_or_absent(record: &Record, field: &str) -> bool {
    matches!(record.get(field), None | Some(Value::Null))
}

/// Renders a grouping value as a plain string key for aggregation output.
///
/// Numbers render without quotes (`200`, not `"200"`), strings render
/// verbatim, everything else falls back to compact JSON.
#[must_use]
pub fn group_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
