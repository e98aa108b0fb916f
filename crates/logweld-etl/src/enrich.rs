//! Enrichment orchestration: profile and weather columns.
//!
//! Enrichment is strictly additive and strictly best-effort. It never adds
//! or removes records, never reorders them, and never fails the run: any
//! per-key or per-record fetch problem degrades to null columns.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use logweld_api::{ApiClient, UserProfile};
use logweld_core::config::EnrichmentConfig;
use logweld_core::record::{f64_field, str_field};
use logweld_core::Record;

use crate::timestamp;

/// Columns appended by profile enrichment.
const PROFILE_COLUMNS: [&str; 5] = [
    "user_age",
    "user_gender",
    "user_premium",
    "user_join_date",
    "user_location",
];

/// Columns appended by weather enrichment.
const WEATHER_COLUMNS: [&str; 4] = [
    "temperature",
    "humidity",
    "weather_condition",
    "weather_description",
];

/// Delay between consecutive weather calls. The profile delay is
/// configurable; this one tracks the weather API's lighter per-call policy.
const WEATHER_CALL_DELAY: Duration = Duration::from_millis(100);

pub struct Enricher {
    profile_api: Option<ApiClient>,
    weather_api: Option<ApiClient>,
    max_profile_keys: usize,
    inter_call_delay: Duration,
}

impl Enricher {
    #[must_use]
    pub fn new(
        profile_api: Option<ApiClient>,
        weather_api: Option<ApiClient>,
        config: &EnrichmentConfig,
    ) -> Self {
        Enricher {
            profile_api,
            weather_api,
            max_profile_keys: config.max_profile_keys,
            inter_call_delay: Duration::from_millis(config.inter_call_delay_ms),
        }
    }

    /// Augments every record in place with enrichment columns.
    ///
    /// Record order and count are preserved exactly. Enrichment sources
    /// that are not configured are skipped without touching the records.
    pub async fn enrich(&self, records: &mut [Record]) {
        if let Some(api) = &self.profile_api {
            let profiles = self.fetch_profiles(api, records).await;
            apply_profiles(records, &profiles);
        }
        if let Some(api) = &self.weather_api {
            // Weather columns only make sense when coordinates exist at all.
            if records.iter().any(|r| r.contains_key("latitude")) {
                self.apply_weather(api, records).await;
            }
        }
    }

    /// Fetches profiles for the capped set of distinct join keys.
    ///
    /// Keys are taken in first-seen order and truncated to the configured
    /// cap — a hard bound on call volume, not a sample. Keys past the cap
    /// and keys whose fetch fails are simply absent from the map.
    async fn fetch_profiles(
        &self,
        api: &ApiClient,
        records: &[Record],
    ) -> BTreeMap<String, UserProfile> {
        let mut keys: Vec<String> = Vec::new();
        for record in records {
            if let Some(id) = str_field(record, "user_id") {
                if !keys.iter().any(|k| k == id) {
                    keys.push(id.to_owned());
                }
            }
        }
        let total = keys.len();
        keys.truncate(self.max_profile_keys);
        tracing::info!(
            distinct_keys = total,
            enriched_keys = keys.len(),
            cap = self.max_profile_keys,
            "fetching user profiles"
        );

        let mut profiles = BTreeMap::new();
        for key in keys {
            match api.user_profile(&key).await {
                Ok(profile) => {
                    profiles.insert(key, profile);
                }
                Err(e) => {
                    tracing::warn!(user_id = %key, error = %e, "profile fetch failed, key left unenriched");
                }
            }
            tokio::time::sleep(self.inter_call_delay).await;
        }
        profiles
    }

    /// Fetches weather per record when coordinates are present.
    async fn apply_weather(&self, api: &ApiClient, records: &mut [Record]) {
        for record in records.iter_mut() {
            let coords = f64_field(record, "latitude").zip(f64_field(record, "longitude"));
            let Some((lat, lon)) = coords else {
                set_null_columns(record, &WEATHER_COLUMNS);
                continue;
            };
            let unix_ts = record
                .get("timestamp")
                .or_else(|| record.get("event_time"))
                .and_then(timestamp::parse_value)
                .map(timestamp::to_unix);
            let Some(unix_ts) = unix_ts else {
                set_null_columns(record, &WEATHER_COLUMNS);
                continue;
            };

            match api.weather(lat, lon, unix_ts).await {
                Ok(weather) => {
                    record.insert("temperature".to_owned(), option_value(weather.temperature));
                    record.insert("humidity".to_owned(), option_value(weather.humidity));
                    record.insert(
                        "weather_condition".to_owned(),
                        option_value(weather.condition),
                    );
                    record.insert(
                        "weather_description".to_owned(),
                        option_value(weather.description),
                    );
                }
                Err(e) => {
                    tracing::warn!(lat, lon, error = %e, "weather fetch failed, leaving null columns");
                    set_null_columns(record, &WEATHER_COLUMNS);
                }
            }
            tokio::time::sleep(WEATHER_CALL_DELAY).await;
        }
    }
}

/// Merges profile columns onto every record by key lookup.
///
/// Outer-join style: a record whose key has no profile still gets the
/// columns, null-filled (premium defaults to `false`, it is a flag rather
/// than an attribute).
fn apply_profiles(records: &mut [Record], profiles: &BTreeMap<String, UserProfile>) {
    for record in records.iter_mut() {
        let profile = str_field(record, "user_id").and_then(|id| profiles.get(id));
        match profile {
            Some(p) => {
                record.insert("user_age".to_owned(), option_value(p.age));
                record.insert("user_gender".to_owned(), option_value(p.gender.clone()));
                record.insert("user_premium".to_owned(), Value::Bool(p.is_premium));
                record.insert("user_join_date".to_owned(), option_value(p.join_date.clone()));
                record.insert("user_location".to_owned(), option_value(p.location.clone()));
            }
            None => {
                set_null_columns(record, &PROFILE_COLUMNS);
                record.insert("user_premium".to_owned(), Value::Bool(false));
            }
        }
    }
}

fn set_null_columns(record: &mut Record, columns: &[&str]) {
    for column in columns {
        record.insert((*column).to_owned(), Value::Null);
    }
}

fn option_value<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}
