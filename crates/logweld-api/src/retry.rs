//! Retry policy with jittered exponential back-off.
//!
//! The policy — attempt count, back-off base, and the set of HTTP statuses
//! worth retrying — is a plain value injected into the client rather than a
//! constant buried at the call site, so tests can zero the delays and
//! operators can tune the schedule per API.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Retry schedule for idempotent GET requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay for exponential back-off: the n-th retry waits
    /// `backoff_base_ms * 2^(n-1)` milliseconds, ±25% jitter, capped.
    pub backoff_base_ms: u64,
    /// HTTP statuses treated as transient.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1_000,
            retryable_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Returns `true` for errors worth another attempt after a back-off delay.
    ///
    /// Retriable: network-level failures (timeout, connection reset) and the
    /// policy's transient HTTP statuses. Everything else — 4xx lookups,
    /// missing payloads, config problems — is returned immediately.
    #[must_use]
    pub fn is_retriable(&self, err: &ApiError) -> bool {
        match err {
            ApiError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status()
                        .is_some_and(|s| self.retryable_statuses.contains(&s.as_u16()))
            }
            ApiError::UnexpectedStatus { status, .. } => self.retryable_statuses.contains(status),
            ApiError::MissingData(_) | ApiError::InvalidBaseUrl { .. } => false,
        }
    }
}

const MAX_DELAY_MS: u64 = 60_000;

/// Runs `operation`, retrying per `policy` on transient errors.
///
/// The last error is returned once retries are exhausted; non-retriable
/// errors are returned without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient API error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn status_err(status: u16) -> ApiError {
        ApiError::UnexpectedStatus {
            status,
            url: "http://api.test/".to_owned(),
        }
    }

    #[test]
    fn transient_statuses_are_retriable() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retriable(&status_err(status)), "status {status}");
        }
    }

    #[test]
    fn client_errors_are_not_retriable() {
        let policy = RetryPolicy::default();
        for status in [400, 401, 403, 404] {
            assert!(!policy.is_retriable(&status_err(status)), "status {status}");
        }
    }

    #[test]
    fn missing_data_is_not_retriable() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retriable(&ApiError::MissingData("empty results".to_owned())));
    }

    #[test]
    fn custom_status_set_overrides_default() {
        let policy = RetryPolicy {
            retryable_statuses: vec![418],
            ..RetryPolicy::default()
        };
        assert!(policy.is_retriable(&status_err(418)));
        assert!(!policy.is_retriable(&status_err(500)));
    }

    fn zero_delay_policy() -> RetryPolicy {
        RetryPolicy {
            backoff_base_ms: 0,
            ..RetryPolicy::default()
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&zero_delay_policy(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ApiError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&zero_delay_policy(), || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(status_err(503))
                } else {
                    Ok::<u32, ApiError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&zero_delay_policy(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ApiError>(status_err(500))
            }
        })
        .await;
        // max_retries = 3 means 4 attempts total.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(
            result,
            Err(ApiError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_missing_data() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&zero_delay_policy(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ApiError>(ApiError::MissingData("no results".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ApiError::MissingData(_))));
    }
}
