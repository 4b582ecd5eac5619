use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::config::RetryConfig;

/// Runs `op` up to `config.max_attempts` times, sleeping with exponential
/// backoff (capped at `max_delay`) between attempts. Only errors accepted by
/// `is_retryable` are retried; the last error is returned on exhaustion.
pub async fn with_backoff<T, E, F, Fut, P>(
    config: &RetryConfig,
    op_name: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retryable(&err) => {
                let delay = backoff_delay(config, attempt);
                tracing::warn!(
                    target: "retry",
                    op = op_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed; retrying"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    config
        .base_delay
        .saturating_mul(factor)
        .min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> =
            with_backoff(&fast_config(3), "op", |_| true, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient")
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_at_attempt_limit() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> =
            with_backoff(&fast_config(3), "op", |_| true, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("still broken")
            })
            .await;
        assert_eq!(result, Err("still broken"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> =
            with_backoff(&fast_config(5), "op", |err| *err != "fatal", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            })
            .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 3), Duration::from_millis(300));
        assert_eq!(backoff_delay(&config, 4), Duration::from_millis(300));
    }
}
