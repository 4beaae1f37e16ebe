//! Retry execution engine.
//!
//! Attempts run strictly in sequence: attempt `n + 1` starts only after attempt
//! `n` has resolved and, when it failed with a retryable error, after the
//! backoff delay has fully elapsed.

use std::future::Future;
use std::pin::pin;
use std::time::{Duration, Instant};

use futures::FutureExt;

use super::classify::{NetworkErrors, RetryPredicate};
use super::error::{ConfigError, Interrupted, RetryError};
use super::policy::RetryPolicy;

/// A successful retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryResult<T> {
    /// The value the operation produced.
    pub result: T,
    /// How many attempts were made, including the successful one (1-indexed).
    pub attempts: u32,
    /// Wall-clock time for the whole sequence. Informational only.
    pub total_time: Duration,
}

impl<T> RetryResult<T> {
    /// Create a new RetryResult.
    pub fn new(result: T, attempts: u32, total_time: Duration) -> Self {
        Self {
            result,
            attempts,
            total_time,
        }
    }

    /// Extract the value, discarding metadata.
    pub fn into_value(self) -> T {
        self.result
    }

    /// Transform the value, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> RetryResult<U>
    where
        F: FnOnce(T) -> U,
    {
        RetryResult {
            result: f(self.result),
            attempts: self.attempts,
            total_time: self.total_time,
        }
    }
}

/// Execute an async operation with retry, validating the policy first.
///
/// This is the one-shot form of [`RetryExecutor`]. A policy with
/// `max_attempts == 0` yields [`RetryError::InvalidPolicy`] and the operation is
/// never invoked. Otherwise the error from the last attempt is returned as
/// [`RetryError::Operation`], exactly as the operation produced it.
///
/// # Example
///
/// ```rust
/// use rebound::{execute_with_retry, OperationError, RetryError, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let outcome = execute_with_retry(
///     || async { Err::<(), _>(OperationError::new("Validation failed")) },
///     RetryPolicy::default(),
/// )
/// .await;
///
/// // Not a network error: surfaced after a single attempt
/// assert_eq!(
///     outcome,
///     Err(RetryError::Operation(OperationError::new("Validation failed")))
/// );
/// # });
/// ```
pub async fn execute_with_retry<F, Fut, T, E, P>(
    operation: F,
    policy: RetryPolicy<P>,
) -> Result<RetryResult<T>, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPredicate<E>,
{
    let executor = RetryExecutor::new(policy)?;
    executor.execute(operation).await.map_err(RetryError::Operation)
}

/// Runs operations under a validated [`RetryPolicy`].
///
/// An executor can be reused for any number of operations, including
/// concurrently; it holds no per-call state.
///
/// # Example
///
/// ```rust
/// use rebound::{OperationError, RetryExecutor, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let executor = RetryExecutor::new(
///     RetryPolicy::default()
///         .with_max_attempts(2)
///         .with_base_delay(Duration::from_millis(1)),
/// )
/// .unwrap();
///
/// let err = executor
///     .execute(|| async { Err::<(), _>(OperationError::from_code("NETWORK_ERROR")) })
///     .await
///     .unwrap_err();
///
/// assert_eq!(err, OperationError::from_code("NETWORK_ERROR"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RetryExecutor<P = NetworkErrors> {
    policy: RetryPolicy<P>,
}

impl<P> RetryExecutor<P> {
    /// Create an executor, rejecting a policy that cannot make any attempt.
    pub fn new(policy: RetryPolicy<P>) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Get the policy this executor runs with.
    pub fn policy(&self) -> &RetryPolicy<P> {
        &self.policy
    }

    /// Execute an operation with retry.
    ///
    /// Returns the first success, or the last error unchanged once attempts are
    /// exhausted or the retry condition rejects an error.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<RetryResult<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: RetryPredicate<E>,
    {
        let start = Instant::now();
        let mut attempt = 1u32;

        loop {
            match operation().await {
                Ok(result) => return Ok(RetryResult::new(result, attempt, start.elapsed())),
                Err(error) => match self.backoff_after(attempt, &error) {
                    Some(delay) => {
                        debug_event!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "sleeping before retry"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(error),
                },
            }
        }
    }

    /// Execute an operation with retry, stopping early when `cancel` resolves.
    ///
    /// The signal is checked before every attempt and raced against every
    /// backoff sleep. An attempt that has already started is allowed to finish.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rebound::{Interrupted, OperationError, RetryExecutor, RetryPolicy};
    ///
    /// # tokio_test::block_on(async {
    /// let executor = RetryExecutor::new(RetryPolicy::default()).unwrap();
    ///
    /// let outcome = executor
    ///     .execute_cancellable(
    ///         || async { Ok::<_, OperationError>(1) },
    ///         std::future::ready(()),
    ///     )
    ///     .await;
    ///
    /// // Already cancelled: the operation never runs
    /// assert_eq!(outcome, Err(Interrupted::Cancelled { attempts: 0, last_error: None }));
    /// # });
    /// ```
    pub async fn execute_cancellable<F, Fut, T, E, C>(
        &self,
        mut operation: F,
        cancel: C,
    ) -> Result<RetryResult<T>, Interrupted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: RetryPredicate<E>,
        C: Future<Output = ()>,
    {
        let start = Instant::now();
        let mut cancel = pin!(cancel.fuse());
        let mut last_error: Option<E> = None;
        let mut attempt = 1u32;

        loop {
            if cancel.as_mut().now_or_never().is_some() {
                debug_event!(attempts = attempt - 1, "retry cancelled before attempt");
                return Err(Interrupted::Cancelled {
                    attempts: attempt - 1,
                    last_error,
                });
            }

            match operation().await {
                Ok(result) => return Ok(RetryResult::new(result, attempt, start.elapsed())),
                Err(error) => {
                    let Some(delay) = self.backoff_after(attempt, &error) else {
                        return Err(Interrupted::Failed(error));
                    };
                    last_error = Some(error);

                    tokio::select! {
                        _ = cancel.as_mut() => {
                            debug_event!(attempts = attempt, "retry cancelled during backoff");
                            return Err(Interrupted::Cancelled { attempts: attempt, last_error });
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Decide what follows a failed attempt: `Some(delay)` to retry, `None` to stop.
    ///
    /// The last allowed attempt stops without consulting the retry condition.
    fn backoff_after<E>(&self, attempt: u32, error: &E) -> Option<Duration>
    where
        P: RetryPredicate<E>,
    {
        if attempt >= self.policy.max_attempts() {
            debug_event!(attempts = attempt, "retry attempts exhausted");
            return None;
        }
        if !self.policy.retry_condition().should_retry(error) {
            debug_event!(attempt, "error is not retryable");
            return None;
        }
        Some(self.policy.delay_for_attempt(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::error::OperationError;
    use crate::retry::jitter::Jitter;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn test_policy() -> RetryPolicy {
        RetryPolicy::default()
            .with_base_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
            .with_jitter(Jitter::None)
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let executor = RetryExecutor::new(test_policy()).unwrap();

        let result = executor
            .execute(|| async { Ok::<_, OperationError>("success") })
            .await
            .unwrap();

        assert_eq!(result.result, "success");
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let attempts = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(test_policy()).unwrap();

        let result = executor
            .execute(|| {
                let attempts = attempts.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(OperationError::new("connection reset"))
                    } else {
                        Ok("success")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_never_consults_predicate() {
        let consulted = Arc::new(AtomicU32::new(0));
        let policy = test_policy().with_max_attempts(1).with_retry_condition({
            let consulted = consulted.clone();
            move |_: &OperationError| {
                consulted.fetch_add(1, Ordering::SeqCst);
                true
            }
        });
        let executor = RetryExecutor::new(policy).unwrap();

        let err = executor
            .execute(|| async { Err::<(), _>(OperationError::from_code("ECONNRESET")) })
            .await
            .unwrap_err();

        assert_eq!(err, OperationError::from_code("ECONNRESET"));
        assert_eq!(consulted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_rejected() {
        let err = RetryExecutor::new(test_policy().with_max_attempts(0)).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveMaxAttempts);
    }

    #[tokio::test]
    async fn test_cancellable_completes_without_signal() {
        let executor = RetryExecutor::new(test_policy()).unwrap();

        let result = executor
            .execute_cancellable(|| async { Ok::<_, OperationError>(7) }, std::future::pending())
            .await
            .unwrap();

        assert_eq!(result.into_value(), 7);
    }

    #[tokio::test]
    async fn test_cancellable_reports_failure_untouched() {
        let executor = RetryExecutor::new(test_policy().with_max_attempts(2)).unwrap();

        let err = executor
            .execute_cancellable(
                || async { Err::<(), _>(OperationError::from_code("EPIPE")) },
                std::future::pending(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, Interrupted::Failed(OperationError::from_code("EPIPE")));
    }

    #[test]
    fn test_retry_result_map() {
        let result = RetryResult::new(2, 3, Duration::from_millis(10)).map(|v| v * 10);
        assert_eq!(result.result, 20);
        assert_eq!(result.attempts, 3);
    }
}
