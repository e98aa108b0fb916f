//! Timestamp parsing shared by validation, enrichment, and aggregation.
//!
//! Input logs carry timestamps as ISO-8601-ish strings in a couple of
//! variants; weather lookups additionally accept raw unix seconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a timestamp string, trying RFC 3339 first, then the naive
/// formats the input logs use, then a bare date (read as midnight).
#[must_use]
pub(crate) fn parse_str(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    // Date-only columns are still valid datetimes.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parses a timestamp from a JSON value: strings via [`parse_str`], numbers
/// as unix seconds.
#[must_use]
pub(crate) fn parse_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Unix seconds for a parsed timestamp.
#[must_use]
pub(crate) fn to_unix(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}
