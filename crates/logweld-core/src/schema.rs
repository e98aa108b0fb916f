//! Declarative dataset schemas for boundary validation.
//!
//! A [`DatasetSchema`] names the required fields, the expected type per
//! field, and any enumerated valid values for a dataset. The defaults mirror
//! the shapes of the two input logs; a JSON schema file can override them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which input log a schema (or a validation result) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    UserActivities,
    ApiLogs,
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dataset::UserActivities => write!(f, "user_activities"),
            Dataset::ApiLogs => write!(f, "api_logs"),
        }
    }
}

/// Expected type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    /// A string holding an RFC 3339 / `%Y-%m-%dT%H:%M:%S` timestamp.
    Datetime,
}

/// Schema for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub field_types: BTreeMap<String, FieldType>,
    /// Enumerated valid values keyed by field name, e.g. allowed `action`
    /// names or allowed `status_code`s. Values outside the enumeration are
    /// warnings, not errors.
    #[serde(default)]
    pub valid_values: BTreeMap<String, Vec<Value>>,
}

/// The full set of schemas, one per dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSet {
    pub user_activities: DatasetSchema,
    pub api_logs: DatasetSchema,
}

impl SchemaSet {
    #[must_use]
    pub fn for_dataset(&self, dataset: Dataset) -> &DatasetSchema {
        match dataset {
            Dataset::UserActivities => &self.user_activities,
            Dataset::ApiLogs => &self.api_logs,
        }
    }

    /// Loads schemas from a JSON file, falling back to [`SchemaSet::default`]
    /// when the file is missing or malformed. A broken schema file should
    /// degrade to the built-in schemas, not kill the run.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "schema file malformed, using defaults");
                    SchemaSet::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "schema file unreadable, using defaults");
                SchemaSet::default()
            }
        }
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        let user_activities = DatasetSchema {
            required_fields: ["user_id", "action", "timestamp", "page_url"]
                .map(String::from)
                .to_vec(),
            field_types: [
                ("user_id", FieldType::String),
                ("action", FieldType::String),
                ("timestamp", FieldType::Datetime),
                ("page_url", FieldType::String),
                ("device_type", FieldType::String),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
            valid_values: [(
                "action".to_owned(),
                ["view", "click", "purchase", "add_to_cart"]
                    .map(Value::from)
                    .to_vec(),
            )]
            .into_iter()
            .collect(),
        };

        let api_logs = DatasetSchema {
            required_fields: [
                "request_id",
                "user_id",
                "endpoint",
                "status_code",
                "response_time",
            ]
            .map(String::from)
            .to_vec(),
            field_types: [
                ("request_id", FieldType::String),
                ("user_id", FieldType::String),
                ("endpoint", FieldType::String),
                ("method", FieldType::String),
                ("status_code", FieldType::Integer),
                ("response_time", FieldType::Float),
                ("timestamp", FieldType::Datetime),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
            valid_values: [(
                "status_code".to_owned(),
                [200, 201, 400, 404, 500].map(Value::from).to_vec(),
            )]
            .into_iter()
            .collect(),
        };

        SchemaSet {
            user_activities,
            api_logs,
        }
    }
}
