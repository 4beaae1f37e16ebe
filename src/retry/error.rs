//! Error types for retry operations.

use std::collections::BTreeMap;
use std::fmt;

/// The retry policy cannot be executed.
///
/// Raised before the operation is ever invoked.
///
/// # Examples
///
/// ```rust
/// use rebound::{ConfigError, RetryExecutor, RetryPolicy};
///
/// let err = RetryExecutor::new(RetryPolicy::default().with_max_attempts(0)).unwrap_err();
/// assert_eq!(err, ConfigError::NonPositiveMaxAttempts);
/// assert_eq!(err.to_string(), "max_attempts must be greater than 0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_attempts` was zero or negative.
    NonPositiveMaxAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMaxAttempts => write!(f, "max_attempts must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by [`execute_with_retry`](crate::execute_with_retry).
///
/// The operation's error is carried as-is: no message is rewritten and no
/// field is dropped, so callers can match on it exactly as if they had called
/// the operation themselves.
///
/// # Examples
///
/// ```rust
/// use rebound::{execute_with_retry, RetryError, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let err = execute_with_retry(
///     || async { Err::<(), _>("Validation failed".to_string()) },
///     RetryPolicy::default(),
/// )
/// .await
/// .unwrap_err();
///
/// assert_eq!(err, RetryError::Operation("Validation failed".to_string()));
/// assert_eq!(err.into_operation_error(), Some("Validation failed".to_string()));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The policy was rejected before any attempt was made.
    InvalidPolicy(ConfigError),
    /// The error from the last attempt that ran.
    Operation(E),
}

impl<E> RetryError<E> {
    /// Returns true if the policy was rejected.
    pub fn is_invalid_policy(&self) -> bool {
        matches!(self, Self::InvalidPolicy(_))
    }

    /// Get the operation's error if one was produced.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::InvalidPolicy(_) => None,
        }
    }

    /// Extract the operation's error, discarding a configuration error.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::InvalidPolicy(_) => None,
        }
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        Self::InvalidPolicy(err)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPolicy(e) => write!(f, "{}", e),
            Self::Operation(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPolicy(e) => Some(e),
            Self::Operation(e) => e.source(),
        }
    }
}

/// Outcome of a cancellable execution that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupted<E> {
    /// The retry sequence ended on its own; carries the last error untouched.
    Failed(E),
    /// The cancellation signal fired before an attempt or during a backoff sleep.
    Cancelled {
        /// Attempts that ran to completion before cancellation.
        attempts: u32,
        /// The error from the last completed attempt, if any ran.
        last_error: Option<E>,
    },
}

impl<E> Interrupted<E> {
    /// Returns true if the cancellation signal stopped the sequence.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The last error the operation produced, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Cancelled { last_error, .. } => last_error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Interrupted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "{}", e),
            Self::Cancelled {
                attempts,
                last_error: Some(e),
            } => write!(f, "retry cancelled after {} attempts: {}", attempts, e),
            Self::Cancelled {
                attempts,
                last_error: None,
            } => write!(f, "retry cancelled after {} attempts", attempts),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Interrupted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => e.source(),
            Self::Cancelled {
                last_error: Some(e),
                ..
            } => Some(e),
            Self::Cancelled {
                last_error: None, ..
            } => None,
        }
    }
}

/// A code/message shaped error for operations that talk to remote services.
///
/// Every part is optional; an `OperationError::default()` has neither a code
/// nor a message and is never retried by the default classifier.
///
/// # Examples
///
/// ```rust
/// use rebound::OperationError;
///
/// let err = OperationError::from_code("NETWORK_ERROR")
///     .with_message("Network timeout")
///     .with_field("status", "503");
///
/// assert_eq!(err.code.as_deref(), Some("NETWORK_ERROR"));
/// assert_eq!(err.fields.get("status").map(String::as_str), Some("503"));
/// assert_eq!(err.to_string(), "Network timeout");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationError {
    /// Machine-readable error code, e.g. `ECONNRESET`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Arbitrary caller-defined fields (HTTP status, request id, ...).
    pub fields: BTreeMap<String, String>,
}

impl OperationError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Create an error with only a code.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a custom field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.code) {
            (Some(message), _) => write!(f, "{}", message),
            (None, Some(code)) => write!(f, "operation failed with code {}", code),
            (None, None) => write!(f, "operation failed"),
        }
    }
}

impl std::error::Error for OperationError {}
