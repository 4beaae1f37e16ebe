//! Testing utilities for code that retries.
//!
//! [`ScriptedOperation`] stands in for a flaky remote call: it replays a fixed
//! sequence of outcomes and counts how often it was invoked.
//!
//! # Examples
//!
//! ```rust
//! use rebound::testing::ScriptedOperation;
//! use rebound::{assert_attempts, execute_with_retry, OperationError, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let op = ScriptedOperation::failing_then(
//!     vec![OperationError::new("network timeout")],
//!     "success",
//! );
//!
//! let outcome = execute_with_retry(
//!     || op.call(),
//!     RetryPolicy::default().with_base_delay(Duration::from_millis(1)),
//! )
//! .await;
//!
//! assert_attempts!(outcome, 2);
//! assert_eq!(op.calls(), 2);
//! # });
//! ```

use std::collections::VecDeque;
use std::future::{self, Ready};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

/// An operation that replays scripted outcomes, then repeats a final one.
#[derive(Debug)]
pub struct ScriptedOperation<T, E> {
    script: Mutex<VecDeque<Result<T, E>>>,
    fallback: Result<T, E>,
    calls: AtomicU32,
}

impl<T, E> ScriptedOperation<T, E> {
    /// Fail with each error in turn, then succeed with `value` on every later call.
    pub fn failing_then(errors: Vec<E>, value: T) -> Self {
        Self {
            script: Mutex::new(errors.into_iter().map(Err).collect()),
            fallback: Ok(value),
            calls: AtomicU32::new(0),
        }
    }

    /// Fail with `error` on every call.
    pub fn always_failing(error: E) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            calls: AtomicU32::new(0),
        }
    }

    /// Succeed with `value` on every call.
    pub fn succeeding(value: T) -> Self {
        Self::failing_then(Vec::new(), value)
    }

    /// How many times [`call`](Self::call) has run.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone, E: Clone> ScriptedOperation<T, E> {
    /// Produce the next scripted outcome.
    pub fn call(&self) -> Ready<Result<T, E>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        future::ready(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Assert that a retry sequence succeeded after exactly `n` attempts.
///
/// Accepts any `Result<RetryResult<T>, _>`.
///
/// # Example
///
/// ```rust
/// use rebound::{assert_attempts, RetryResult};
/// use std::time::Duration;
///
/// let outcome: Result<_, ()> = Ok(RetryResult::new("done", 3, Duration::ZERO));
/// assert_attempts!(outcome, 3);
/// ```
#[macro_export]
macro_rules! assert_attempts {
    ($outcome:expr, $n:expr) => {
        match $outcome {
            Ok($crate::RetryResult { attempts, .. }) => {
                assert_eq!(attempts, $n, "unexpected number of attempts");
            }
            Err(e) => {
                panic!("Expected success after {} attempts, got error: {:?}", $n, e);
            }
        }
    };
}
