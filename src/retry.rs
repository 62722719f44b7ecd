use crate::config::RetrySettings;
use crate::error::{KeeperError, KeeperResult};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, Duration::from_millis(settings.delay_ms))
    }
}

/// Runs `operation` up to `max_attempts` times with a fixed pause in between.
///
/// Every call of `operation` must build its attempt from scratch (fresh nonce,
/// fresh fee data). Errors that are not retryable end the loop immediately and
/// come back unchanged; otherwise the last error is wrapped in
/// [`KeeperError::RetriesExhausted`].
pub async fn execute_with_retry<F, Fut, T>(
    operation: F,
    retry_config: &RetryConfig,
    operation_name: &str,
) -> KeeperResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = KeeperResult<T>>,
{
    let max_attempts = retry_config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!("🔄 {} attempt {}/{}", operation_name, attempt, max_attempts);

        match operation().await {
            Ok(result) => {
                info!("✅ {} succeeded on attempt {}", operation_name, attempt);
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => {
                warn!("❌ {} failed with a non-retryable error: {}", operation_name, e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "❌ {} failed on attempt {}/{}: {}",
                    operation_name, attempt, max_attempts, e
                );

                if attempt >= max_attempts {
                    return Err(KeeperError::RetriesExhausted {
                        operation: operation_name.to_string(),
                        attempts: max_attempts,
                        last: Box::new(e),
                    });
                }

                info!("⏳ Waiting {:?} before retry...", retry_config.delay);
                sleep(retry_config.delay).await;
            }
        }

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_retry_success_on_first_attempt() {
        let config = RetryConfig::default();
        let call_count = AtomicU32::new(0);

        let result = execute_with_retry(
            || {
                let count = call_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    if count == 0 {
                        Ok("success")
                    } else {
                        Err(KeeperError::Network("unexpected call".into()))
                    }
                }
            },
            &config,
            "test_operation",
        )
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let config = RetryConfig::new(3, Duration::from_millis(10));
        let call_count = AtomicU32::new(0);

        let result = execute_with_retry(
            || {
                let count = call_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    if count == 0 {
                        Err(KeeperError::Network("first attempt fails".into()))
                    } else {
                        Ok("success")
                    }
                }
            },
            &config,
            "test_operation",
        )
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_failure_after_max_attempts() {
        let config = RetryConfig::new(2, Duration::from_millis(10));
        let call_count = AtomicU32::new(0);

        let result = execute_with_retry(
            || {
                call_count.fetch_add(1, Ordering::SeqCst);
                async move { Err::<(), _>(KeeperError::Network("always fails".into())) }
            },
            &config,
            "test_operation",
        )
        .await;

        match result {
            Err(KeeperError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, KeeperError::Network(_)));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let config = RetryConfig::new(5, Duration::from_millis(10));
        let call_count = AtomicU32::new(0);

        let result = execute_with_retry(
            || {
                call_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err::<(), _>(KeeperError::Configuration("missing key".into()))
                }
            },
            &config,
            "test_operation",
        )
        .await;

        assert!(matches!(result, Err(KeeperError::Configuration(_))));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let config = RetryConfig::new(4, Duration::from_millis(2000));
        let started = Instant::now();

        let result = execute_with_retry(
            || async { Err::<(), _>(KeeperError::Network("down".into())) },
            &config,
            "test_operation",
        )
        .await;

        assert!(result.is_err());
        // Three pauses between four attempts, none after the last one
        assert_eq!(started.elapsed(), Duration::from_millis(6000));
    }
}
