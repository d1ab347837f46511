//! Bounded retry with exponential backoff
//!
//! Shared by the reasoning client and the Telegram send path.

use std::future::Future;
use std::time::Duration;

/// Retry policy for outbound HTTP calls
///
/// `max_attempts` counts the first try. The wait before attempt `n + 1` is
/// `base_delay * 2^(n - 1)` clamped into `[min_delay, max_delay]`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Multiplier of the exponential schedule
    pub base_delay: Duration,
    /// Floor applied to every wait
    pub min_delay: Duration,
    /// Ceiling applied to every wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without waiting (tests, local fakes)
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Whether an HTTP status is transient
///
/// Rate limits (429) and server errors (5xx) are worth retrying.
#[must_use]
pub fn is_recoverable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Extract a `retry_after` duration from a Telegram Bot API error body
///
/// Telegram encodes the value in seconds at `parameters.retry_after`.
#[must_use]
pub fn parse_retry_after(body: &str) -> Option<Duration> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let secs = v.get("parameters")?.get("retry_after")?.as_u64()?;

    Some(Duration::from_secs(secs))
}

/// Compute the wait after the `attempt`-th failed try (1-based)
///
/// A server-provided `retry_after` wins but is still capped at `max_delay`.
#[must_use]
pub fn delay_for_attempt(
    policy: &RetryPolicy,
    attempt: u32,
    retry_after: Option<Duration>,
) -> Duration {
    if let Some(ra) = retry_after {
        return ra.min(policy.max_delay);
    }

    let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
    policy
        .base_delay
        .saturating_mul(exp)
        .clamp(policy.min_delay, policy.max_delay)
}

/// Run `op` until it succeeds, fails permanently, or attempts run out
///
/// `op` receives the 1-based attempt number. The last error is returned
/// unchanged once `is_retryable` rejects it or the budget is spent.
///
/// # Errors
///
/// Returns the error of the final attempt
pub async fn retry<T, E, F, Fut, P>(policy: &RetryPolicy, is_retryable: P, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                let delay = delay_for_attempt(policy, attempt, None);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
