//! # Rebound
//!
//! Retry asynchronous operations with exponential, jittered backoff.
//!
//! An operation is re-run only when its failure is classified as transient.
//! Everything else (a validation error, a permission error, the final attempt's
//! failure) comes back to the caller exactly as the operation produced it.
//!
//! ## Quick Example
//!
//! ```rust
//! use rebound::{execute_with_retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::default()
//!     .with_max_attempts(3)
//!     .with_base_delay(Duration::from_millis(10))
//!     .with_max_delay(Duration::from_millis(50));
//!
//! let outcome = execute_with_retry(|| async { Ok::<_, String>("success") }, policy).await;
//!
//! let outcome = outcome.unwrap();
//! assert_eq!(outcome.result, "success");
//! assert_eq!(outcome.attempts, 1);
//! # });
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit debug-level events for classification, delays and sleeps
//! - `serde`: (de)serialize [`RetryOptions`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// Debug event that only exists when the `tracing` feature is enabled.
macro_rules! debug_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub mod retry;
pub mod testing;

// Re-exports
pub use retry::{
    execute_with_retry, with_retry, with_timeout, ConfigError, ErrorDetails, Interrupted,
    Jitter, NetworkErrors, OperationError, RetryError, RetryExecutor, RetryOptions,
    RetryPolicy, RetryPredicate, RetryResult, RetryWrapper, TimeoutError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{
        execute_with_retry, with_retry, with_timeout, ErrorDetails, OperationError,
        RetryError, RetryExecutor, RetryPolicy, RetryPredicate, RetryResult,
    };
}
