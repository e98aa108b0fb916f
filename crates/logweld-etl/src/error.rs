use thiserror::Error;

use crate::report::ReportError;

/// Fatal pipeline errors.
///
/// Everything here aborts the run before or while producing output.
/// Validation findings and enrichment failures are *data*, not errors, and
/// never appear as `EtlError`.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("failed to read input file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON on line {line} of {path}: {source}")]
    MalformedLine {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write artifact {path}: {source}")]
    ArtifactIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact {name}: {source}")]
    ArtifactSerialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] logweld_core::ConfigError),

    #[error("API client setup failed: {0}")]
    ApiSetup(#[from] logweld_api::ApiError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
