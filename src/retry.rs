//! Retry with exponential backoff.
//!
//! `BackoffPolicy` is a pure mapping from attempt number to delay;
//! `retry_with_backoff` drives an async operation through it. Terminal
//! errors (see [`crate::error::ErrorClass`]) propagate on first occurrence;
//! transient errors retry until the attempt budget runs out, after which the
//! last error is surfaced as [`FetchError::RetryExhausted`].

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{ErrorClass, FetchError};
use crate::governor::Clock;

/// Pure backoff policy: attempt number in, delay out.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    config: RetryConfig,
}

impl BackoffPolicy {
    /// Create a policy from an immutable retry configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Maximum attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Delay before retrying after the given zero-based attempt failed.
    ///
    /// Exponential in the attempt number, jittered, and clamped to the
    /// configured ceiling. Never negative.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let base =
            self.config.base_delay_secs * self.config.exponential_base.powi(attempt as i32);
        let jitter = if self.config.jitter_fraction > 0.0 {
            rand::thread_rng()
                .gen_range(-self.config.jitter_fraction..=self.config.jitter_fraction)
        } else {
            0.0
        };
        let secs = (base * (1.0 + jitter)).min(self.config.max_delay_secs).max(0.0);
        Duration::from_secs_f64(secs)
    }

    /// Whether another attempt should be made after `attempt` failed with an
    /// error of the given class.
    pub fn should_retry(&self, attempt: u32, class: ErrorClass) -> bool {
        if class == ErrorClass::Terminal {
            return false;
        }
        attempt + 1 < self.config.max_attempts
    }
}

/// Drive an async operation through a backoff policy.
///
/// Invokes `operation` up to `max_attempts` times. Success returns the
/// result; a terminal error propagates immediately without sleeping; a
/// transient error sleeps the policy delay and retries. When the budget is
/// exhausted the last error is wrapped in [`FetchError::RetryExhausted`].
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    clock: &dyn Clock,
    label: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} attempts", label, attempt + 1);
                }
                return Ok(value);
            }
            Err(err) => {
                if !policy.should_retry(attempt, err.class()) {
                    return Err(match err.class() {
                        ErrorClass::Terminal => err,
                        ErrorClass::Transient => FetchError::RetryExhausted {
                            attempts: attempt + 1,
                            source: Box::new(err),
                        },
                    });
                }

                let delay = policy.next_delay(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt + 1,
                    policy.max_attempts(),
                    err,
                    delay.as_secs_f64()
                );
                clock.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter_policy() -> BackoffPolicy {
        BackoffPolicy::new(RetryConfig {
            jitter_fraction: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_delays_grow_exponentially() {
        let policy = no_jitter_policy();
        assert_eq!(policy.next_delay(0), Duration::from_secs(5));
        assert_eq!(policy.next_delay(1), Duration::from_secs(10));
        assert_eq!(policy.next_delay(2), Duration::from_secs(20));
    }

    #[test]
    fn test_delay_clamps_to_max() {
        let policy = no_jitter_policy();
        assert_eq!(policy.next_delay(10), Duration::from_secs(300));
        assert_eq!(policy.next_delay(30), Duration::from_secs(300));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = BackoffPolicy::new(RetryConfig::default());
        for attempt in 0..3 {
            let delay = policy.next_delay(attempt).as_secs_f64();
            let base = 5.0 * 2.0_f64.powi(attempt as i32);
            assert!(delay >= base * 0.7 - 1e-9);
            assert!(delay <= base * 1.3 + 1e-9);
        }
    }

    #[test]
    fn test_attempt_budget() {
        let policy = no_jitter_policy();
        assert!(policy.should_retry(0, ErrorClass::Transient));
        assert!(policy.should_retry(1, ErrorClass::Transient));
        assert!(!policy.should_retry(2, ErrorClass::Transient));
        assert!(!policy.should_retry(0, ErrorClass::Terminal));
    }
}
