use thiserror::Error;

/// Errors raised while loading or validating the pipeline configuration.
///
/// All of these are fatal: the pipeline refuses to start on a broken config
/// rather than limping along with partial settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("environment variable {0} referenced by config is not set")]
    MissingEnvVar(String),

    #[error("invalid config: {0}")]
    Validation(String),
}
