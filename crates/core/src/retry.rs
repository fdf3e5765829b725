//! Shared retry / exponential-backoff policy for provider calls.
//!
//! Every component that talks to a generation provider retries through a
//! [`RetryPolicy`] instead of hand-rolled sleep loops, so attempt budgets and
//! delays are configured in one place. Only errors whose
//! [`Retryable::is_retryable`] returns `true` are retried; everything else is
//! returned to the caller after the first attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Classifies an error as transient (worth retrying) or permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Tunable parameters for exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retrying.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay (before jitter).
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failed attempt.
    pub multiplier: f64,
    /// Uniform jitter added on top of the backoff, in `[0, max_jitter]`.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy with `max_attempts` and no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            max_jitter: Duration::ZERO,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::immediate(1)
    }

    /// Backoff delay (without jitter) before retry number `retry` (1-based).
    ///
    /// The result is clamped to [`RetryPolicy::max_delay`].
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let ms = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = ms.min(self.max_delay.as_millis() as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    /// Backoff delay plus uniform jitter drawn from `rng`.
    pub fn delay_with_jitter<R: Rng + ?Sized>(&self, retry: u32, rng: &mut R) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rng.random_range(0..=jitter_ms)
        };
        self.backoff_delay(retry) + Duration::from_millis(jitter)
    }

    /// Run `op` until it succeeds, returns a permanent error, or the attempt
    /// budget is exhausted. The closure receives the 1-based attempt number.
    ///
    /// On exhaustion the error of the last attempt is returned.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.delay_with_jitter(attempt, &mut rand::rng());
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    #[test]
    fn backoff_doubles_and_clamps() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(5),
            ..Default::default()
        };
        let delays: Vec<u64> = (1..=5).map(|n| policy.backoff_delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);
    }

    #[test]
    fn custom_multiplier() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(2),
            multiplier: 3.0,
            max_delay: Duration::from_secs(60),
            ..Default::default()
        };
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(6));
    }

    #[test]
    fn jitter_stays_within_bound() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let d = policy.delay_with_jitter(1, &mut rng);
            assert!(d >= Duration::from_secs(1));
            assert!(d <= Duration::from_secs(2));
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run(|_| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(TestError::Transient)
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(3)
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;
        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(5)
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Permanent)
            })
            .await;
        assert_eq!(result, Err(TestError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_between_attempts() {
        let policy = RetryPolicy {
            max_jitter: Duration::ZERO,
            ..Default::default()
        };
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = policy.run(|_| async { Err(TestError::Transient) }).await;
        // Two retries: 1s + 2s.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
