//! Rate-limited HTTP client for the enrichment APIs.
//!
//! One [`ApiClient`] per configured service. Every request passes through
//! the rolling one-minute [`RateLimiter`] and the injected [`RetryPolicy`];
//! the generic [`ApiClient::request`] call returns loose JSON, and the typed
//! endpoint methods in `endpoints.rs` translate the service envelopes into
//! pipeline field names.

use std::time::Duration;

use reqwest::{Client, Url};

use logweld_core::config::ApiEndpointConfig;

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::retry::{retry_with_backoff, RetryPolicy};

const USER_AGENT: &str = "logweld/0.1 (batch-etl)";

#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    limiter: RateLimiter,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Creates a client with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] for an unparseable
    /// base URL.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        rate_limit_per_minute: u32,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        Self::with_policy(
            base_url,
            api_key,
            rate_limit_per_minute,
            timeout_secs,
            RetryPolicy::default(),
        )
    }

    /// Creates a client with an explicit retry policy (tests zero the
    /// back-off base to avoid real sleeps).
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn with_policy(
        base_url: &str,
        api_key: Option<&str>,
        rate_limit_per_minute: u32,
        timeout_secs: u64,
        policy: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends the
        // endpoint instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(str::to_owned),
            limiter: RateLimiter::new(rate_limit_per_minute),
            policy,
        })
    }

    /// Creates a client from a configured API entry.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn from_config(config: &ApiEndpointConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            config.api_key.as_deref(),
            config.rate_limit_per_minute,
            config.timeout_secs,
        )
    }

    /// Issues a GET request and returns the response body as JSON.
    ///
    /// Waits on the rate limiter before the first attempt; the retry policy
    /// covers transient statuses and transport failures. A 2xx body that is
    /// not valid JSON is returned as `{"raw_response": <text>}` rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UnexpectedStatus`] — non-2xx after retries exhausted.
    /// - [`ApiError::Http`] — network failure after retries exhausted.
    ///
    /// Enrichment callers treat any error as "no data for this key."
    pub async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ApiError> {
        self.limiter.acquire().await;
        let url = self.build_url(endpoint, params)?;

        retry_with_backoff(&self.policy, || {
            let url = url.clone();
            async move {
                let mut request = self.client.get(url.clone());
                if let Some(key) = &self.api_key {
                    request = request.bearer_auth(key);
                }
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ApiError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                let body = response.text().await?;
                match serde_json::from_str(&body) {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "response body is not JSON, keeping raw text");
                        Ok(serde_json::json!({ "raw_response": body }))
                    }
                }
            }
        })
        .await
    }

    /// Builds the full request URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}
