//! Bounded retry with exponential backoff
//!
//! One reusable primitive consumed by every provider call, replacing the
//! per-operation retry loops. Only errors classified as retryable
//! (rate-limit responses) are retried; everything else passes through on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Retry bounds for rate-limited provider calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based): base * 2^(retry-1).
    fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

/// Run `op` until it succeeds, fails terminally, or exhausts the policy.
///
/// A `RateLimited` error that carries a provider `Retry-After` hint waits
/// the longer of the hint and the backoff step. Exhaustion yields
/// `ApiError::RateLimitExceeded`. The sleeps are plain `tokio::time::sleep`
/// calls, so a caller-level timeout or `select!` cancels a waiting retry
/// cleanly.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => {
                if attempt >= policy.max_attempts {
                    tracing::warn!(
                        "giving up after {} rate-limited attempts",
                        policy.max_attempts
                    );
                    return Err(ApiError::RateLimitExceeded {
                        attempts: policy.max_attempts,
                    });
                }
                let mut delay = policy.delay_for(attempt);
                if let ApiError::RateLimited(Some(retry_after)) = err {
                    delay = delay.max(Duration::from_secs(retry_after));
                }
                tracing::debug!(
                    "rate limited (attempt {}/{}), backing off {:?}",
                    attempt,
                    policy.max_attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
