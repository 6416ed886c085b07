//! Bounded retry around a single page fetch

use crate::config::FetchConfig;
use crate::crawler::PageFetcher;
use crate::{ExportError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// How many times a page is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Fetches a page, retrying transport failures with a fixed delay
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Success | Return body |
/// | Transport error / HTTP status | Log, wait `delay`, try again |
/// | Last attempt failed | `ExhaustedRetries` wrapping the last error |
/// | Any other error (bad URL) | Returned immediately |
///
/// The delay never grows and is not applied after the final attempt.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match fetcher.fetch_page(url).await {
            Ok(body) => {
                if attempt > 1 {
                    tracing::info!("Fetched {} on attempt {}", url, attempt);
                }
                return Ok(body);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                tracing::warn!("Attempt {} failed for URL: {}: {}", attempt, url, e);

                if attempt >= max_attempts {
                    return Err(ExportError::ExhaustedRetries {
                        url: url.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }

                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::test_support::ScriptedFetcher;
    use std::time::Instant;

    const URL: &str = "https://vndb.org/u2/ulist?p=1";

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::from_config(&FetchConfig::default()), policy);
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let fetcher = ScriptedFetcher::new().page(URL, "<html></html>");
        let body = fetch_with_retry(&fetcher, URL, &quick_policy(3)).await.unwrap();
        assert_eq!(body, "<html></html>");
        assert_eq!(fetcher.call_count(URL), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures() {
        let fetcher = ScriptedFetcher::new().page(URL, "ok").fail(URL, 2);
        let body = fetch_with_retry(&fetcher, URL, &quick_policy(3)).await.unwrap();
        assert_eq!(body, "ok");
        assert_eq!(fetcher.call_count(URL), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_wraps_last_error() {
        let fetcher = ScriptedFetcher::new().page(URL, "ok").fail(URL, 3);
        let err = fetch_with_retry(&fetcher, URL, &quick_policy(3))
            .await
            .unwrap_err();

        assert_eq!(fetcher.call_count(URL), 3);
        match err {
            ExportError::ExhaustedRetries {
                url,
                attempts,
                source,
            } => {
                assert_eq!(url, URL);
                assert_eq!(attempts, 3);
                assert!(matches!(*source, ExportError::Transport { .. }));
            }
            other => panic!("expected ExhaustedRetries, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let fetcher = ScriptedFetcher::new().page(URL, "ok").fail(URL, 1);
        assert!(fetch_with_retry(&fetcher, URL, &quick_policy(1)).await.is_err());
        assert_eq!(fetcher.call_count(URL), 1);
    }

    #[tokio::test]
    async fn test_delay_between_attempts_only() {
        let fetcher = ScriptedFetcher::new().page(URL, "ok").fail(URL, 5);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(30),
        };

        let started = Instant::now();
        let _ = fetch_with_retry(&fetcher, URL, &policy).await;
        let elapsed = started.elapsed();

        // Two pauses for three attempts
        assert!(elapsed >= Duration::from_millis(60), "elapsed {:?}", elapsed);
        assert_eq!(fetcher.call_count(URL), 3);
    }
}
