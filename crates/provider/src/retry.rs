//! Bounded-retry transport policy for outbound provider calls.
//!
//! Every vendor HTTP call runs through [`with_retry`]: exponential
//! backoff between attempts, a hard timeout around each individual
//! attempt, and a cap on the total attempt count.  Transport failures,
//! timeouts, and non-2xx responses are all treated as retryable; after
//! the final attempt the last error is surfaced unchanged.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Tunable parameters for the exponential-backoff retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first. Minimum effective value is 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Hard timeout on each individual attempt; the in-flight call is
    /// aborted when it elapses.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            attempt_timeout: Duration::from_secs(120),
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Run `attempt` up to `config.max_attempts` times.
///
/// Returns the first success, or the error from the final attempt.  A
/// partial or empty success is never fabricated on exhaustion.  The
/// policy does not distinguish retryable from non-retryable API errors;
/// a 4xx burns attempts exactly like a transport failure.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut attempt: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut delay = config.initial_delay;
    let mut last_error: Option<ProviderError> = None;
    let max_attempts = config.max_attempts.max(1);

    for attempt_no in 1..=max_attempts {
        match tokio::time::timeout(config.attempt_timeout, attempt()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(
                    attempt = attempt_no,
                    max_attempts,
                    error = %e,
                    "Provider call failed",
                );
                last_error = Some(e);
            }
            Err(_elapsed) => {
                let timeout_secs = config.attempt_timeout.as_secs();
                tracing::warn!(
                    attempt = attempt_no,
                    max_attempts,
                    timeout_secs,
                    "Provider call timed out",
                );
                last_error = Some(ProviderError::Timeout { timeout_secs });
            }
        }

        if attempt_no < max_attempts {
            tokio::time::sleep(delay).await;
            delay = next_delay(delay, config);
        }
    }

    Err(last_error.unwrap_or(ProviderError::NoAttempts))
}
