//! Timeout enforcement.
//!
//! # Responsibilities
//! - Move a blocking check onto Tokio's blocking pool
//! - Bound it with a deadline
//!
//! # Design Decisions
//! - A timed-out probe keeps its blocking thread until the child process
//!   exits; the caller stops waiting and reports `TimedOut`
//! - Panics inside a check become `Aborted`, never a crashed run

use std::time::Duration;

use tokio::time;

use crate::health::HealthCheckFailure;

/// Run `check` on the blocking pool, failing with `TimedOut` after `timeout`.
pub async fn run_blocking_with_timeout<F>(timeout: Duration, check: F) -> Result<(), HealthCheckFailure>
where
    F: FnOnce() -> Result<(), HealthCheckFailure> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(check);
    match time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(HealthCheckFailure::Aborted(join_error.to_string())),
        Err(_) => Err(HealthCheckFailure::TimedOut(timeout)),
    }
}
