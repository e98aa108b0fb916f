//! Pipeline configuration: YAML file + environment-sourced credentials.
//!
//! The config file names the two input logs, the external APIs used for
//! enrichment, the enrichment bounds, and the upload target. API keys are
//! never stored in the file; each API entry names the environment variable
//! holding its credential and the key is resolved at load time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ConfigError;

/// Role of a configured data source in the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    UserActivities,
    ApiLogs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    pub role: SourceRole,
    pub path: PathBuf,
}

/// One external API used for enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEndpointConfig {
    pub base_url: String,
    /// Name of the environment variable holding the bearer credential.
    /// Resolved into `api_key` at load time; absent means unauthenticated.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_rate_limit() -> u32 {
    60
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}

/// Bounds on enrichment call volume.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Hard cap on distinct join keys that get a profile lookup.
    #[serde(default = "default_max_profile_keys")]
    pub max_profile_keys: usize,
    /// Fixed delay between consecutive profile calls, in milliseconds.
    #[serde(default = "default_inter_call_delay_ms")]
    pub inter_call_delay_ms: u64,
}

fn default_max_profile_keys() -> usize {
    10
}

fn default_inter_call_delay_ms() -> u64 {
    500
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        EnrichmentConfig {
            max_profile_keys: default_max_profile_keys(),
            inter_call_delay_ms: default_inter_call_delay_ms(),
        }
    }
}

/// Where output artifacts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Local,
    Remote,
    Both,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub destination: Destination,
    pub bucket: String,
    pub region: String,
    /// Override for the bucket endpoint, mainly for tests against a mock
    /// server. Defaults to `https://{bucket}.s3.{region}.amazonaws.com`.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub data_sources: Vec<DataSourceConfig>,
    #[serde(default)]
    pub apis: BTreeMap<String, ApiEndpointConfig>,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    #[serde(default)]
    pub upload: Option<UploadConfig>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl PipelineConfig {
    /// Path of the source with the given role.
    #[must_use]
    pub fn source_path(&self, role: SourceRole) -> Option<&Path> {
        self.data_sources
            .iter()
            .find(|s| s.role == role)
            .map(|s| s.path.as_path())
    }

    /// Enabled API config by name, if present.
    #[must_use]
    pub fn api(&self, name: &str) -> Option<&ApiEndpointConfig> {
        self.apis.get(name).filter(|a| a.enabled)
    }
}

/// Loads, validates, and resolves the pipeline configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, if fewer
/// than two data sources are configured, if either join role is missing, or
/// if a referenced credential environment variable is unset.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let config: PipelineConfig = serde_yaml::from_str(&content)?;
    build_pipeline_config(config, |key| std::env::var(key))
}

/// Validation and credential resolution, decoupled from the real environment
/// so tests can drive it with a plain lookup closure.
fn build_pipeline_config<F>(
    mut config: PipelineConfig,
    lookup: F,
) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    if config.data_sources.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "config must name at least two data sources, found {}",
            config.data_sources.len()
        )));
    }
    for role in [SourceRole::UserActivities, SourceRole::ApiLogs] {
        if config.source_path(role).is_none() {
            return Err(ConfigError::Validation(format!(
                "no data source with role {role:?}"
            )));
        }
    }

    for (name, api) in &mut config.apis {
        if api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "api '{name}' has an empty base_url"
            )));
        }
        if api.rate_limit_per_minute == 0 {
            return Err(ConfigError::Validation(format!(
                "api '{name}' has rate_limit_per_minute = 0"
            )));
        }
        if let Some(var) = &api.api_key_env {
            let key = lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.clone()))?;
            api.api_key = Some(key);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> PipelineConfig {
        serde_yaml::from_str(yaml).expect("yaml should parse")
    }

    fn no_env(_: &str) -> Result<String, std::env::VarError> {
        Err(std::env::VarError::NotPresent)
    }

    const MINIMAL: &str = r"
data_sources:
  - role: user_activities
    path: data/user_activities.json
  - role: api_logs
    path: data/api_logs.json
";

    #[test]
    fn minimal_config_passes_validation() {
        let config = build_pipeline_config(parse(MINIMAL), no_env).unwrap();
        assert!(config
            .source_path(SourceRole::UserActivities)
            .unwrap()
            .ends_with("user_activities.json"));
        assert!(config.apis.is_empty());
        assert_eq!(config.enrichment.max_profile_keys, 10);
        assert_eq!(config.enrichment.inter_call_delay_ms, 500);
    }

    #[test]
    fn fewer_than_two_sources_is_fatal() {
        let yaml = r"
data_sources:
  - role: api_logs
    path: data/api_logs.json
";
        let err = build_pipeline_config(parse(yaml), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_role_is_fatal() {
        let yaml = r"
data_sources:
  - role: api_logs
    path: a.json
  - role: api_logs
    path: b.json
";
        let err = build_pipeline_config(parse(yaml), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn api_key_resolved_from_env() {
        let yaml = r"
data_sources:
  - role: user_activities
    path: a.json
  - role: api_logs
    path: b.json
apis:
  weather_api:
    base_url: https://api.openweathermap.org/data/2.5
    api_key_env: WEATHER_API_KEY
";
        let config = build_pipeline_config(parse(yaml), |var| {
            assert_eq!(var, "WEATHER_API_KEY");
            Ok("secret".to_owned())
        })
        .unwrap();
        assert_eq!(
            config.api("weather_api").unwrap().api_key.as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn missing_credential_env_var_is_fatal() {
        let yaml = r"
data_sources:
  - role: user_activities
    path: a.json
  - role: api_logs
    path: b.json
apis:
  weather_api:
    base_url: https://api.openweathermap.org/data/2.5
    api_key_env: WEATHER_API_KEY
";
        let err = build_pipeline_config(parse(yaml), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "WEATHER_API_KEY"));
    }

    #[test]
    fn disabled_api_is_not_returned() {
        let yaml = r"
data_sources:
  - role: user_activities
    path: a.json
  - role: api_logs
    path: b.json
apis:
  user_profile_api:
    base_url: https://randomuser.me/api
    enabled: false
";
        let config = build_pipeline_config(parse(yaml), no_env).unwrap();
        assert!(config.api("user_profile_api").is_none());
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let yaml = r"
data_sources:
  - role: user_activities
    path: a.json
  - role: api_logs
    path: b.json
apis:
  user_profile_api:
    base_url: https://randomuser.me/api
    rate_limit_per_minute: 0
";
        let err = build_pipeline_config(parse(yaml), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn upload_defaults_endpoint_to_none() {
        let yaml = r"
data_sources:
  - role: user_activities
    path: a.json
  - role: api_logs
    path: b.json
upload:
  destination: both
  bucket: etl-output
  region: ap-southeast-2
";
        let config = build_pipeline_config(parse(yaml), no_env).unwrap();
        let upload = config.upload.unwrap();
        assert_eq!(upload.destination, Destination::Both);
        assert_eq!(upload.bucket, "etl-output");
        assert!(upload.endpoint.is_none());
    }
}
