//! Group-by aggregations over the joined (and possibly enriched) records.
//!
//! Every aggregation is computed independently and tolerates absent fields.
//! `BTreeMap` keys make the outputs deterministic: aggregating the same
//! input twice yields byte-identical artifacts.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde_json::Value;

use logweld_core::record::{f64_field, group_key, str_field};
use logweld_core::Record;

use crate::timestamp;

/// One aggregation artifact: grouping key → count or mean.
pub type AggregationResult = BTreeMap<String, Value>;

/// Artifact names for the frequency counts that are always produced.
const COUNT_FIELDS: [(&str, &str); 6] = [
    ("action_counts", "action"),
    ("page_visit_counts", "page_url"),
    ("device_counts", "device_type"),
    ("status_code_counts", "status_code"),
    ("endpoint_counts", "endpoint"),
    ("request_counts_per_user", "user_id"),
];

/// Enrichment distributions, produced only when the field is present.
const ENRICHMENT_COUNT_FIELDS: [(&str, &str); 6] = [
    ("user_age_distribution", "user_age"),
    ("user_gender_distribution", "user_gender"),
    ("user_premium_distribution", "user_premium"),
    ("country_distribution", "country"),
    ("city_distribution", "city"),
    ("weather_condition_distribution", "weather_condition"),
];

/// Computes the full set of aggregations, keyed by artifact name.
///
/// The core aggregations are always present (empty when their field is
/// missing from every record); enrichment distributions appear only when
/// their field exists somewhere in the input.
#[must_use]
pub fn aggregate(records: &[Record]) -> BTreeMap<String, AggregationResult> {
    let mut artifacts = BTreeMap::new();

    for (name, field) in COUNT_FIELDS {
        artifacts.insert(name.to_owned(), count_by(records, field));
    }
    artifacts.insert(
        "avg_response_time_per_endpoint".to_owned(),
        mean_by(records, "endpoint", "response_time"),
    );
    artifacts.insert(
        "avg_time_diff_per_user".to_owned(),
        mean_time_diff_per_user(records),
    );

    for (name, field) in ENRICHMENT_COUNT_FIELDS {
        if has_field(records, field) {
            artifacts.insert(name.to_owned(), count_by(records, field));
        }
    }
    if has_field(records, "temperature") {
        artifacts.insert("temperature_stats".to_owned(), temperature_stats(records));
    }

    artifacts
}

fn has_field(records: &[Record], field: &str) -> bool {
    records.iter().any(|r| r.contains_key(field))
}

/// Frequency count grouped by `field`, nulls skipped.
fn count_by(records: &[Record], field: &str) -> AggregationResult {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let Some(value) = record.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        *counts.entry(group_key(value)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect()
}

/// Mean of `value_field` grouped by `group_field`; rows missing either
/// field are skipped.
fn mean_by(records: &[Record], group_field: &str, value_field: &str) -> AggregationResult {
    let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for record in records {
        let Some(group) = record.get(group_field) else {
            continue;
        };
        if group.is_null() {
            continue;
        }
        let Some(value) = f64_field(record, value_field) else {
            continue;
        };
        let entry = sums.entry(group_key(group)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, n))| {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / n as f64;
            (k, Value::from(mean))
        })
        .collect()
}

/// Per-user mean of consecutive-timestamp deltas, in seconds.
///
/// Records are walked in original row order, never re-sorted by time; the
/// first record for each user contributes a zero delta (and counts toward
/// the mean). Deltas are signed, so out-of-order timestamps show up as
/// negative contributions rather than being silently dropped.
fn mean_time_diff_per_user(records: &[Record]) -> AggregationResult {
    let mut last_seen: HashMap<String, NaiveDateTime> = HashMap::new();
    let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();

    for record in records {
        let Some(user_id) = str_field(record, "user_id") else {
            continue;
        };
        let Some(ts) = record.get("timestamp").and_then(timestamp::parse_value) else {
            continue;
        };
        let delta_secs = last_seen.get(user_id).map_or(0.0, |prev| {
            #[allow(clippy::cast_precision_loss)]
            let millis = (ts - *prev).num_milliseconds() as f64;
            millis / 1000.0
        });
        let entry = sums.entry(user_id.to_owned()).or_insert((0.0, 0));
        entry.0 += delta_secs;
        entry.1 += 1;
        last_seen.insert(user_id.to_owned(), ts);
    }

    sums.into_iter()
        .map(|(k, (sum, n))| {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / n as f64;
            (k, Value::from(mean))
        })
        .collect()
}

/// Min / mean / max of the enriched `temperature` column.
fn temperature_stats(records: &[Record]) -> AggregationResult {
    let temps: Vec<f64> = records
        .iter()
        .filter_map(|r| f64_field(r, "temperature"))
        .collect();
    if temps.is_empty() {
        return AggregationResult::new();
    }

    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let mean = temps.iter().sum::<f64>() / temps.len() as f64;

    [("min", min), ("mean", mean), ("max", max)]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), Value::from(v)))
        .collect()
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod aggregate_test;
