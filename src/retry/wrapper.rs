//! Retry-enabled versions of async functions.

use std::future::Future;

use super::classify::{NetworkErrors, RetryPredicate};
use super::error::RetryError;
use super::executor::execute_with_retry;
use super::policy::RetryPolicy;

/// An async function whose every call runs under a retry policy.
///
/// Arguments are passed as one value (use a tuple for several) and cloned into
/// each attempt. The metadata of the retry sequence is dropped; a call returns
/// just the value, or the error from [`execute_with_retry`].
///
/// # Example
///
/// ```rust
/// use rebound::{with_retry, OperationError, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let enroll = with_retry(
///     |(class_id, student): (u32, String)| async move {
///         Ok::<_, OperationError>(format!("{} joined class {}", student, class_id))
///     },
///     RetryPolicy::default(),
/// );
///
/// let message = enroll.call((7, "Aisha".to_string())).await.unwrap();
/// assert_eq!(message, "Aisha joined class 7");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RetryWrapper<F, P = NetworkErrors> {
    function: F,
    policy: RetryPolicy<P>,
}

/// Create a retry-enabled version of `function`.
pub fn with_retry<F, P>(function: F, policy: RetryPolicy<P>) -> RetryWrapper<F, P> {
    RetryWrapper { function, policy }
}

impl<F, P> RetryWrapper<F, P> {
    /// Get the policy every call runs with.
    pub fn policy(&self) -> &RetryPolicy<P> {
        &self.policy
    }

    /// Call the wrapped function with retry.
    pub async fn call<A, Fut, T, E>(&self, args: A) -> Result<T, RetryError<E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
        P: RetryPredicate<E> + Clone,
    {
        let operation = || (self.function)(args.clone());
        let outcome = execute_with_retry(operation, self.policy.clone()).await?;
        Ok(outcome.into_value())
    }
}

#[cfg(test)]
mod wrapper_tests {
    use super::*;
    use crate::retry::error::{ConfigError, OperationError};
    use crate::retry::jitter::Jitter;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(2)
            .with_base_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(50))
            .with_jitter(Jitter::None)
    }

    #[tokio::test]
    async fn test_wrapper_retries_with_same_arguments() {
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

        let wrapped = with_retry(
            {
                let seen = seen.clone();
                move |(a, b): (String, String)| {
                    let seen = seen.clone();
                    async move {
                        let mut calls = seen.lock().unwrap();
                        calls.push((a, b));
                        if calls.len() == 1 {
                            Err(OperationError::new("network timeout"))
                        } else {
                            Ok("success")
                        }
                    }
                }
            },
            fast_policy(),
        );

        let result = wrapped
            .call(("arg1".to_string(), "arg2".to_string()))
            .await
            .unwrap();

        assert_eq!(result, "success");
        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(a, b)| a == "arg1" && b == "arg2"));
    }

    #[tokio::test]
    async fn test_wrapper_propagates_error_unchanged() {
        let original = OperationError::new("Validation failed").with_field("field", "email");
        let wrapped = with_retry(
            {
                let original = original.clone();
                move |_: ()| {
                    let original = original.clone();
                    async move { Err::<(), _>(original) }
                }
            },
            fast_policy(),
        );

        let err = wrapped.call(()).await.unwrap_err();
        assert_eq!(err, RetryError::Operation(original));
    }

    #[tokio::test]
    async fn test_wrapper_with_invalid_policy() {
        let wrapped = with_retry(
            |_: ()| async { Ok::<_, OperationError>(1) },
            fast_policy().with_max_attempts(0),
        );

        let err = wrapped.call(()).await.unwrap_err();
        assert_eq!(err, RetryError::InvalidPolicy(ConfigError::NonPositiveMaxAttempts));
    }
}
