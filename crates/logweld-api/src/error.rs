use thiserror::Error;

/// Errors returned by the enrichment API client.
///
/// Callers in the enrichment path treat every variant as "no data for this
/// key" — an `ApiError` never propagates past the orchestrator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx HTTP status after all retries were exhausted.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response parsed, but the expected payload was absent
    /// (e.g. an empty `results` array, or a failed lookup status).
    #[error("API response missing expected data: {0}")]
    MissingData(String),

    /// The configured base URL could not be parsed.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// HTTP status associated with the failure, when one exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::MissingData(_) | ApiError::InvalidBaseUrl { .. } => None,
        }
    }
}
