// src/error_recovery.rs
//! Opt-in retry with linear backoff for rate-limited API calls.
//!
//! Retries are disabled by default: with `max_retries == 0` every failure
//! surfaces on the first attempt.

use crate::constants::DEFAULT_RETRY_BACKOFF;
use crate::error::LoaderError;
use std::time::Duration;

/// How often and how patiently to retry retryable API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }

    fn should_retry(&self, attempt: u32, error: &LoaderError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Retries a blocking operation while it fails with a retryable error.
pub fn retry_blocking<F, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, LoaderError>
where
    F: FnMut() -> Result<T, LoaderError>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if policy.should_retry(attempt, &e) => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{}; retrying {}/{} after {:?}",
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                std::thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Retries an async operation while it fails with a retryable error.
pub async fn retry_async<F, T, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, LoaderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LoaderError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if policy.should_retry(attempt, &e) => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{}; retrying {}/{} after {:?}",
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorCode;

    fn rate_limited() -> LoaderError {
        LoaderError::Api {
            code: ApiErrorCode::RateLimited,
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: "http://localhost/v1/spaces".to_string(),
            message: "slow down".to_string(),
        }
    }

    #[test]
    fn test_no_retry_by_default() {
        let mut calls = 0;
        let result: Result<(), _> = retry_blocking(&RetryPolicy::default(), || {
            calls += 1;
            Err(rate_limited())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_retryable_errors_until_success() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;
        let result = retry_blocking(&policy, || {
            calls += 1;
            if calls < 3 {
                Err(rate_limited())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_non_retryable_errors_fail_immediately() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), _> = retry_blocking(&policy, || {
            calls += 1;
            Err(LoaderError::MalformedResponse("bad".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_async_retry_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), _> = retry_async(&policy, || {
            calls += 1;
            async { Err(rate_limited()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
