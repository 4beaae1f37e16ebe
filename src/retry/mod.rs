//! Retry with exponential backoff for transient failures.
//!
//! The pieces are split the same way the retry loop uses them:
//!
//! - **Policy**: [`RetryPolicy`] is plain data describing how many attempts to
//!   make, how delays grow, and which failures are worth retrying
//! - **Classification**: [`RetryPredicate`] decides per error; the default
//!   [`NetworkErrors`] looks at an error's code and message via [`ErrorDetails`]
//! - **Execution**: [`RetryExecutor`] runs the attempts strictly one after the
//!   other, sleeping between them
//!
//! # Quick Start
//!
//! ```rust
//! use rebound::{OperationError, RetryExecutor, RetryPolicy};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let counter = AtomicU32::new(0);
//! let calls = &counter;
//! let executor = RetryExecutor::new(
//!     RetryPolicy::default().with_base_delay(Duration::from_millis(1)),
//! )
//! .unwrap();
//!
//! let outcome = executor
//!     .execute(move || async move {
//!         if calls.fetch_add(1, Ordering::SeqCst) == 0 {
//!             Err(OperationError::from_code("ECONNRESET"))
//!         } else {
//!             Ok(42)
//!         }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(outcome.result, 42);
//! assert_eq!(outcome.attempts, 2);
//! # });
//! ```
//!
//! # Delay Schedule
//!
//! The delay after attempt `n` is `base_delay * backoff_factor^(n - 1)`, capped
//! at `max_delay`, then moved by up to ±12.5% of the capped value and floored
//! at zero. See [`RetryPolicy::delay_for_attempt`].
//!
//! # Error Types
//!
//! - [`ConfigError`]: the policy cannot run (`max_attempts` is zero)
//! - [`RetryError`]: returned by [`execute_with_retry`], either a bad policy or
//!   the operation's own error, untouched
//! - [`Interrupted`]: returned by cancellable execution
//! - [`TimeoutError`]: produced by [`with_timeout`] around a single attempt

mod classify;
mod error;
mod executor;
mod jitter;
mod options;
mod policy;
mod timeout;
mod wrapper;

pub use classify::{ErrorDetails, NetworkErrors, RetryPredicate};
pub use error::{ConfigError, Interrupted, OperationError, RetryError};
pub use executor::{execute_with_retry, RetryExecutor, RetryResult};
pub use jitter::Jitter;
pub use options::RetryOptions;
pub use policy::RetryPolicy;
pub use timeout::{with_timeout, TimeoutError};
pub use wrapper::{with_retry, RetryWrapper};
