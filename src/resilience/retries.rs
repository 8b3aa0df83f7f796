//! Retry logic.
//!
//! # Responsibilities
//! - Repeat a failing check until it passes or attempts run out
//! - Sleep with exponential backoff + jitter between attempts
//!
//! # Design Decisions
//! - Default is one attempt: a check is a single observation
//! - Non-transient failures (missing inventory data) are never retried

use std::future::Future;

use crate::config::RetryConfig;
use crate::health::HealthCheckFailure;
use crate::resilience::backoff::calculate_backoff;

/// Outcome of a retried check.
#[derive(Debug)]
pub struct Attempted {
    pub result: Result<(), HealthCheckFailure>,
    pub attempts: u32,
}

/// Run `check` up to `config.max_attempts` times.
pub async fn retry_check<F, Fut>(config: &RetryConfig, mut check: F) -> Attempted
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), HealthCheckFailure>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = check().await;
        match result {
            Err(failure) if attempt < max_attempts && failure.is_transient() => {
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                tracing::debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    reason = %failure,
                    "Check failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            result => {
                return Attempted {
                    result,
                    attempts: attempt,
                }
            }
        }
    }
}
