//! Retry executor with exponential backoff.
//!
//! Every gateway call in the pipeline goes through a [`Retrier`]. The sleep
//! and jitter strategies are injected so tests can run without waiting and
//! assert on the exact delays.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;

use crate::errors::{GatewayError, RetryClass, RetryExhausted};

/// Default number of attempts per operation.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Delay before the second attempt; doubled for each later one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound of the random jitter added after an internal service fault.
pub const DEFAULT_INTERNAL_JITTER: Duration = Duration::from_millis(250);

/// Errors that can be classified for retry purposes.
pub trait Retryable {
    fn retry_class(&self) -> RetryClass;
}

impl Retryable for GatewayError {
    fn retry_class(&self) -> RetryClass {
        GatewayError::retry_class(self)
    }
}

// ============================================================================
// Sleep & jitter strategies
// ============================================================================

/// Pauses the calling task.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Records requested sleeps instead of waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}

/// Picks a random extra delay in `[0, max]`.
pub trait Jitter: Send + Sync {
    fn sample(&self, max: Duration) -> Duration;
}

/// Uniform jitter from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..=max.as_secs_f64()))
    }
}

/// Always returns the same fraction of the jitter window.
#[derive(Clone, Copy, Debug)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn sample(&self, max: Duration) -> Duration {
        max.mul_f64(self.0.clamp(0.0, 1.0))
    }
}

// ============================================================================
// Policy & executor
// ============================================================================

/// Attempt budget and delay shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub internal_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            internal_jitter: DEFAULT_INTERNAL_JITTER,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Backoff before the attempt following failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }
}

/// Runs fallible async operations under a [`RetryPolicy`].
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn Jitter>,
}

impl std::fmt::Debug for Retrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Retrier {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>, jitter: Arc<dyn Jitter>) -> Self {
        Self {
            policy,
            sleeper,
            jitter,
        }
    }

    /// Retrier that sleeps on tokio and draws random jitter.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(TokioSleeper), Arc::new(RandomJitter))
    }

    /// Runs `operation` with the configured attempt budget.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &str,
        operation: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        self.run_with_attempts(name, self.policy.attempts, operation)
            .await
    }

    /// Runs `operation` up to `attempts` times.
    ///
    /// No delay follows the final attempt; its error is returned wrapped in
    /// [`RetryExhausted`] together with the operation name.
    pub async fn run_with_attempts<T, E, F, Fut>(
        &self,
        name: &str,
        attempts: u32,
        mut operation: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        let attempts = attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} succeeded on attempt {}/{}", name, attempt + 1, attempts);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        "Retry {}/{} for {}: {}",
                        attempt + 1,
                        attempts,
                        name,
                        err
                    );

                    if attempt + 1 >= attempts {
                        return Err(RetryExhausted {
                            operation: name.to_string(),
                            attempts,
                            source: err,
                        });
                    }

                    let delay = self.delay_for(attempt, err.retry_class());
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn delay_for(&self, attempt: u32, class: RetryClass) -> Duration {
        let backoff = self.policy.backoff(attempt);
        match class {
            RetryClass::InternalFault => {
                backoff.saturating_add(self.jitter.sample(self.policy.internal_jitter))
            }
            RetryClass::Transient => backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retrier(sleeper: Arc<RecordingSleeper>, jitter: f64) -> Retrier {
        Retrier::new(RetryPolicy::default(), sleeper, Arc::new(FixedJitter(jitter)))
    }

    fn internal() -> GatewayError {
        GatewayError::Internal {
            message: "overloaded".to_string(),
        }
    }

    fn malformed() -> GatewayError {
        GatewayError::Malformed {
            endpoint: "Bonds".to_string(),
            message: "unexpected shape".to_string(),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_n_minus_one_failures() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 0.0);
        let calls = AtomicU32::new(0);

        let result = retrier
            .run("get_bond_coupons", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 4 {
                        Err(malformed())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            sleeper.recorded(),
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
            ]
        );
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_budget() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 1.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retrier
            .run("list_bonds", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(internal()) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.operation, "list_bonds");
        assert_eq!(err.attempts, DEFAULT_ATTEMPTS);
        assert!(matches!(err.source, GatewayError::Internal { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_ATTEMPTS);

        let slept = sleeper.recorded();
        assert_eq!(slept.len(), DEFAULT_ATTEMPTS as usize - 1);
        assert!(slept.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_internal_fault_adds_jitter() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 1.0);
        let calls = AtomicU32::new(0);

        let _ = retrier
            .run_with_attempts("get_bond_coupons", 2, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(internal()) }
            })
            .await;

        assert_eq!(sleeper.recorded(), vec![Duration::from_millis(750)]);
    }

    #[tokio::test]
    async fn test_transient_has_no_jitter() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 1.0);

        let _ = retrier
            .run_with_attempts("get_last_prices", 3, || async {
                Err::<(), _>(GatewayError::Unauthorized)
            })
            .await;

        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
    }

    #[tokio::test]
    async fn test_first_success_never_sleeps() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 0.5);

        let value = retrier
            .run("list_bonds", || async { Ok::<_, GatewayError>("ok") })
            .await
            .unwrap();

        assert_eq!(value, "ok");
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let retrier = retrier(sleeper.clone(), 0.0);
        let calls = AtomicU32::new(0);

        let result = retrier
            .run_with_attempts("list_bonds", 0, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(malformed()) }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_random_jitter_stays_in_window() {
        let max = Duration::from_millis(250);
        for _ in 0..100 {
            assert!(RandomJitter.sample(max) <= max);
        }
        assert_eq!(RandomJitter.sample(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert!(policy.backoff(40) > Duration::from_secs(1_000_000));
    }
}
