//! Retry logic with exponential backoff and jitter.
//!
//! Used by the language model client so that transient API failures
//! (timeouts, rate limits, 5xx) are retried before a stage is reported failed.

use std::future::Future;
use std::time::Duration;

/// Backoff policy for retrying a fallible operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries).
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,

    /// Multiplier applied per retry.
    pub backoff_multiplier: f64,

    /// Add up to 25% jitter to each delay.
    pub jitter: bool,
}

impl RetryPolicy {
    /// Policy for language model API calls (longer waits).
    pub fn api() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay =
            if self.jitter { capped_delay * (1.0 + rand_jitter() * 0.25) } else { capped_delay };

        Duration::from_millis(final_delay as u64)
    }
}

/// Pseudo-random value in `[0, 1)` from the clock's sub-second nanos.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1000) / 1000.0
}

/// Outcome of [`retry_async`].
#[derive(Debug)]
pub struct Retried<T, E> {
    /// The final result (success or last error).
    pub result: Result<T, E>,

    /// Number of attempts made, including the first.
    pub attempts: u32,
}

impl<T, E> Retried<T, E> {
    /// Whether more than one attempt was made.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Get the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Retry an async operation while `is_transient` says the error is worth retrying.
pub async fn retry_async<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Retried<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempts = 0;

    loop {
        attempts += 1;
        let result = operation().await;

        let retries_used = attempts - 1;
        match &result {
            Err(e) if retries_used < policy.max_retries && is_transient(e) => {
                let delay = policy.delay_for_retry(attempts);
                tracing::debug!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "Retrying");
                tokio::time::sleep(delay).await;
            }
            _ => return Retried { result, attempts },
        }
    }
}
