use crate::errors::{FlowError, FlowResult};
use std::{future::Future, time::Duration};
use tracing::warn;

/// What to do with a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Wait for the given delay, then try again.
    Retry(Duration),
    /// Propagate the failure as is.
    Fatal,
}

/// Backoff policy for flows that hit provider rate limits. Only
/// `FlowError::RateLimited` is ever retried; every other failure is fatal on
/// the first occurrence.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl RetryPolicy {
    /// Classify a failed attempt. `attempt` is 1 for the failure of the
    /// first call.
    #[must_use]
    pub fn decide(&self, error: &FlowError, attempt: u32) -> Decision {
        match error {
            FlowError::RateLimited { retry_after, .. } if attempt <= self.max_retries => {
                Decision::Retry(backoff_delay(attempt, *retry_after))
            }
            _ => Decision::Fatal,
        }
    }

    /// Drive `op` until it succeeds or a failure is classified as fatal.
    /// The caller's request stays pending for the full backoff duration;
    /// this is a blocking wait, not a queued job.
    pub async fn run<T, F, Fut>(&self, op: F) -> FlowResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = FlowResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    match self.decide(&error, attempt) {
                        Decision::Fatal => return Err(error),
                        Decision::Retry(delay) => {
                            warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "rate limit hit, retrying after backoff"
                            );
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }
    }
}

/// Compute the backoff delay for a failed attempt (1-based). With a "retry
/// in N seconds" hint from the backend, the delay is `ceil(N * 1000)` ms
/// plus a one second buffer; without one it doubles per attempt starting
/// from four seconds.
#[must_use]
pub fn backoff_delay(attempt: u32, hint_secs: Option<f64>) -> Duration {
    match hint_secs {
        Some(secs) if secs.is_finite() && secs >= 0.0 => {
            Duration::from_millis((secs * 1000.0).ceil() as u64 + 1000)
        }
        _ => Duration::from_millis(2000 * 2u64.pow(attempt)),
    }
}

#[cfg(test)]
mod tests {
    use super::{backoff_delay, Decision, RetryPolicy};
    use crate::errors::FlowError;
    use std::time::Duration;

    fn rate_limited(retry_after: Option<f64>) -> FlowError {
        FlowError::RateLimited {
            status: 429,
            retry_after,
            message: "quota exceeded".to_string(),
        }
    }

    #[test]
    fn hinted_delay_is_ceil_plus_buffer() {
        assert_eq!(
            backoff_delay(1, Some(27.5)),
            Duration::from_millis(28_500)
        );
        assert_eq!(backoff_delay(3, Some(4.0)), Duration::from_millis(5000));
    }

    #[test]
    fn unhinted_delay_doubles_per_attempt() {
        assert_eq!(backoff_delay(1, None), Duration::from_millis(4000));
        assert_eq!(backoff_delay(2, None), Duration::from_millis(8000));
        assert_eq!(backoff_delay(3, None), Duration::from_millis(16_000));
    }

    #[test]
    fn retries_rate_limits_up_to_the_cap() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.decide(&rate_limited(None), 3),
            Decision::Retry(_)
        ));
        assert_eq!(policy.decide(&rate_limited(None), 4), Decision::Fatal);
    }

    #[test]
    fn never_retries_other_failures() {
        let policy = RetryPolicy::default();
        let schema = FlowError::SchemaMismatch("bad".to_string());
        assert_eq!(policy.decide(&schema, 1), Decision::Fatal);
        let backend = FlowError::Backend("boom".to_string());
        assert_eq!(policy.decide(&backend, 1), Decision::Fatal);
    }
}
