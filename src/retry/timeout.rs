//! Per-attempt timeouts.
//!
//! The executor never times out an operation on its own; a hung attempt hangs
//! the whole sequence. Wrap the attempt with [`with_timeout`] when that matters.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use super::classify::ErrorDetails;

/// Error returned when an attempt times out.
///
/// Can wrap either a timeout or an inner error from the attempt.
///
/// # Examples
///
/// ```rust
/// use rebound::{with_timeout, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let slow = async {
///     tokio::time::sleep(Duration::from_secs(10)).await;
///     Ok::<_, String>(42)
/// };
///
/// match with_timeout(slow, Duration::from_millis(10)).await {
///     Err(TimeoutError::Timeout { duration }) => {
///         assert_eq!(duration, Duration::from_millis(10));
///     }
///     _ => panic!("Expected timeout"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The attempt timed out.
    Timeout {
        /// The timeout duration that was exceeded.
        duration: Duration,
    },
    /// An inner error occurred before timeout.
    Inner(E),
}

impl<E> TimeoutError<E> {
    /// Create a timeout error.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Get the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "operation timed out after {:?}", duration),
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}

/// A timeout reports `ETIMEDOUT`, which the default classifier retries.
impl<E: ErrorDetails> ErrorDetails for TimeoutError<E> {
    fn code(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Timeout { .. } => Some(Cow::Borrowed("ETIMEDOUT")),
            Self::Inner(e) => e.code(),
        }
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Timeout { duration } => Some(Cow::Owned(format!(
                "operation timed out after {:?}",
                duration
            ))),
            Self::Inner(e) => e.message(),
        }
    }
}

/// Bound a single attempt by `duration`.
///
/// Meant to be used inside the operation handed to the executor, so that each
/// attempt gets its own deadline.
///
/// # Example
///
/// ```rust
/// use rebound::{execute_with_retry, with_timeout, OperationError, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let outcome = execute_with_retry(
///     || with_timeout(async { Ok::<_, OperationError>("fast") }, Duration::from_secs(1)),
///     RetryPolicy::default(),
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(outcome.result, "fast");
/// # });
/// ```
pub async fn with_timeout<T, E, Fut>(future: Fut, duration: Duration) -> Result<T, TimeoutError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TimeoutError::Inner(e)),
        Err(_) => Err(TimeoutError::Timeout { duration }),
    }
}
