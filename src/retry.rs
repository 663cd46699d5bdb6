// Retry with exponential backoff for rate-limited provider calls
// Only HTTP 429 is retried; every other error is returned on first failure.

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    // Backoff before retry number `retry_attempt` (0-based)
    pub fn calculate_backoff(&self, retry_attempt: u32) -> Duration {
        let base_backoff_ms = (self.initial_backoff_ms as f64
            * self.backoff_multiplier.powf(retry_attempt as f64))
        .min(self.max_backoff_ms as f64);

        if self.jitter_factor <= 0.0 {
            return Duration::from_millis(base_backoff_ms as u64);
        }

        let jitter = rand::random::<f64>() * self.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - self.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }
}

pub async fn retry_on_rate_limit<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt < config.max_retries => {
                let backoff = config.calculate_backoff(attempt);
                tracing::warn!(
                    label,
                    attempt = attempt + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    "Provider rate limited request, backing off"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    fn rate_limited() -> ApiError {
        ApiError::Upstream {
            status: 429,
            status_text: "Too Many Requests".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            max_retries: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 500,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        };
        assert_eq!(config.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(config.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(config.calculate_backoff(2), Duration::from_millis(400));
        assert_eq!(config.calculate_backoff(3), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_jitter_stays_in_band() {
        let config = RetryConfig {
            jitter_factor: 0.2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10_000,
            ..Default::default()
        };
        for _ in 0..50 {
            let ms = config.calculate_backoff(0).as_millis();
            assert!((900..=1100).contains(&ms), "backoff out of band: {}", ms);
        }
    }

    #[tokio::test]
    async fn test_retries_429_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = retry_on_rate_limit(&fast_config(3), "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(rate_limited())
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), ApiError> =
            retry_on_rate_limit(&fast_config(2), "test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            })
            .await;

        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), ApiError> =
            retry_on_rate_limit(&fast_config(3), "test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Upstream {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                    body: String::new(),
                })
            })
            .await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
