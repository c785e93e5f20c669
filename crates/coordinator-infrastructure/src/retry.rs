//! Shared bounded exponential backoff for the upstream HTTP adapters, per
//! the error-propagation policy: `Transient`/`UpstreamUnavailable` errors
//! get a small number of automatic retries before surfacing to the caller.

use std::time::Duration;

use coordinator_domain::error::{Error, ErrorKind, Result};
use tracing::warn;

/// Retry policy: a fixed number of attempts with doubling backoff between
/// them, applied only to errors whose kind is retryable.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_backoff: Duration::from_millis(200) }
    }
}

fn is_retryable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Transient | ErrorKind::UpstreamUnavailable)
}

/// Run `operation` under `policy`, retrying while it returns a retryable
/// error. The last error is returned once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && is_retryable(err.kind()) => {
                warn!(operation_name, attempt, error = %err, "retrying after transient failure");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_after_transient_failures_within_budget() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { max_attempts: 3, initial_backoff: Duration::from_millis(1) };
        let result = with_retry(policy, "probe", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(Error::transient("probe", "not ready yet"))
                } else {
                    Ok::<_, Error>(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let result: Result<()> = with_retry(policy, "probe", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::validation("bad input")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausting_attempts_returns_the_last_error() {
        let policy = RetryPolicy { max_attempts: 2, initial_backoff: Duration::from_millis(1) };
        let result: Result<()> =
            with_retry(policy, "probe", || async { Err(Error::upstream_unavailable("probe", "down")) }).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UpstreamUnavailable);
    }
}
