//! Retry with exponential backoff for transient Admin API failures.
//!
//! Only rate limiting (HTTP 429) and network-level errors are retried.
//! Everything else (404s, unexpected statuses, body parse failures) is
//! propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::OrdersError;

/// Returns `true` when `err` is a transient condition worth retrying.
fn is_transient(err: &OrdersError) -> bool {
    matches!(
        err,
        OrdersError::RateLimited { .. } | OrdersError::Http(_)
    )
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional attempts after the first.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
/// A 429 that carries a `Retry-After` hint waits at least that long; the
/// server's ask wins over our schedule when it is larger.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-transient error immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, OrdersError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OrdersError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_transient(&err) || attempt >= max_retries {
            return Err(err);
        }

        // Cap the shift so extreme configs cannot overflow.
        let mut delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        if let OrdersError::RateLimited {
            retry_after_secs, ..
        } = &err
        {
            delay_secs = delay_secs.max(*retry_after_secs);
        }

        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient orders API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
