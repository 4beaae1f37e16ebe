//! Failure classification: which errors are worth another attempt.

use std::borrow::Cow;
use std::io;

use super::error::OperationError;

/// Error codes the default classifier treats as transient.
const NETWORK_ERROR_CODES: &[&str] = &[
    "NETWORK_ERROR",
    "ECONNREFUSED",
    "ETIMEDOUT",
    "ENOTFOUND",
    "ECONNRESET",
    "EPIPE",
    "EHOSTUNREACH",
];

/// Lowercase message fragments the default classifier treats as transient.
const NETWORK_KEYWORDS: &[&str] = &[
    "network timeout",
    "connection refused",
    "connection reset",
    "host unreachable",
    "network error",
    "fetch failed",
];

/// Decides whether a failed attempt should be retried.
///
/// Any `Fn(&E) -> bool` closure is a predicate, so custom rules rarely need a
/// named type.
///
/// # Example
///
/// ```rust
/// use rebound::{OperationError, RetryPredicate};
///
/// let custom = |err: &OperationError| err.code.as_deref() == Some("CUSTOM_ERROR");
///
/// assert!(custom.should_retry(&OperationError::from_code("CUSTOM_ERROR")));
/// assert!(!custom.should_retry(&OperationError::from_code("ECONNRESET")));
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Returns true if the error is transient and another attempt may succeed.
    fn should_retry(&self, error: &E) -> bool;
}

impl<E: ?Sized, F> RetryPredicate<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        self(error)
    }
}

/// The parts of an error the default classifier inspects.
///
/// Both parts are optional. `message` falls back to the error's string form
/// for types that have no separate message.
pub trait ErrorDetails {
    /// Machine-readable code such as `ECONNRESET`, if the error carries one.
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Human-readable message, if any.
    fn message(&self) -> Option<Cow<'_, str>>;
}

impl ErrorDetails for str {
    fn message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl ErrorDetails for String {
    fn message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl<T: ErrorDetails + ?Sized> ErrorDetails for &T {
    fn code(&self) -> Option<Cow<'_, str>> {
        (**self).code()
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        (**self).message()
    }
}

/// `None` stands for an absent error and is never retryable.
impl<T: ErrorDetails> ErrorDetails for Option<T> {
    fn code(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(ErrorDetails::code)
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(ErrorDetails::message)
    }
}

impl ErrorDetails for OperationError {
    fn code(&self) -> Option<Cow<'_, str>> {
        self.code.as_deref().map(Cow::Borrowed)
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        self.message.as_deref().map(Cow::Borrowed)
    }
}

impl ErrorDetails for io::Error {
    fn code(&self) -> Option<Cow<'_, str>> {
        io_error_code(self.kind()).map(Cow::Borrowed)
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl ErrorDetails for Box<dyn std::error::Error + Send + Sync> {
    fn code(&self) -> Option<Cow<'_, str>> {
        if let Some(err) = self.downcast_ref::<io::Error>() {
            return err.code();
        }
        if let Some(err) = self.downcast_ref::<OperationError>() {
            return err.code();
        }
        None
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

/// POSIX-style code for the I/O error kinds that indicate network trouble.
fn io_error_code(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        io::ErrorKind::ConnectionReset => Some("ECONNRESET"),
        io::ErrorKind::TimedOut => Some("ETIMEDOUT"),
        io::ErrorKind::BrokenPipe => Some("EPIPE"),
        io::ErrorKind::HostUnreachable => Some("EHOSTUNREACH"),
        io::ErrorKind::NetworkUnreachable => Some("ENETUNREACH"),
        io::ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        _ => None,
    }
}

/// The default classifier: retries network-looking failures only.
///
/// An error is retryable if its code is one of `NETWORK_ERROR`,
/// `ECONNREFUSED`, `ETIMEDOUT`, `ENOTFOUND`, `ECONNRESET`, `EPIPE`,
/// `EHOSTUNREACH`, or if its message contains (ignoring case) one of
/// `network timeout`, `connection refused`, `connection reset`,
/// `host unreachable`, `network error`, `fetch failed`.
///
/// # Example
///
/// ```rust
/// use rebound::{NetworkErrors, OperationError, RetryPredicate};
///
/// assert!(NetworkErrors.should_retry(&OperationError::from_code("ETIMEDOUT")));
/// assert!(NetworkErrors.should_retry(&"Fetch failed: 502".to_string()));
/// assert!(!NetworkErrors.should_retry(&OperationError::new("Validation failed")));
/// assert!(!NetworkErrors.should_retry(&None::<OperationError>));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkErrors;

impl NetworkErrors {
    /// Returns true if the code is one of the transient network codes.
    pub fn is_network_code(code: &str) -> bool {
        NETWORK_ERROR_CODES.contains(&code)
    }

    /// Returns true if the message mentions a transient network condition.
    pub fn is_network_message(message: &str) -> bool {
        let message = message.to_lowercase();
        NETWORK_KEYWORDS
            .iter()
            .any(|keyword| message.contains(keyword))
    }
}

impl<E: ErrorDetails + ?Sized> RetryPredicate<E> for NetworkErrors {
    fn should_retry(&self, error: &E) -> bool {
        if error
            .code()
            .is_some_and(|code| Self::is_network_code(&code))
        {
            return true;
        }

        let message = error.message();
        let retryable = message
            .as_deref()
            .is_some_and(Self::is_network_message);

        debug_event!(
            error = message.as_deref().unwrap_or_default(),
            should_retry = retryable,
            "retry condition evaluated"
        );

        retryable
    }
}

#[cfg(test)]
mod classify_tests {
    use super::*;

    #[test]
    fn test_every_network_code_is_retryable() {
        for code in NETWORK_ERROR_CODES {
            let err = OperationError::from_code(*code).with_message(format!("Test error: {}", code));
            assert!(NetworkErrors.should_retry(&err), "{} should retry", code);
        }
    }

    #[test]
    fn test_every_network_keyword_is_retryable() {
        for keyword in NETWORK_KEYWORDS {
            assert!(NetworkErrors.should_retry(*keyword), "{} should retry", keyword);
        }
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        assert!(NetworkErrors.should_retry("Network Timeout while loading classes"));
        assert!(NetworkErrors.should_retry("TypeError: FETCH FAILED"));
    }

    #[test]
    fn test_unrelated_errors_are_not_retryable() {
        assert!(!NetworkErrors.should_retry("Validation failed"));
        assert!(!NetworkErrors.should_retry(&OperationError::from_code("ACCESS_DENIED")));
        assert!(!NetworkErrors.should_retry(&OperationError::default()));
    }

    #[test]
    fn test_absent_error_is_not_retryable() {
        let err: Option<OperationError> = None;
        assert!(!NetworkErrors.should_retry(&err));

        let err = Some(OperationError::from_code("ECONNRESET"));
        assert!(NetworkErrors.should_retry(&err));
    }

    #[test]
    fn test_io_error_kinds() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(refused.code().as_deref(), Some("ECONNREFUSED"));
        assert!(NetworkErrors.should_retry(&refused));

        let timed_out = io::Error::new(io::ErrorKind::TimedOut, "deadline");
        assert!(NetworkErrors.should_retry(&timed_out));

        let missing = io::Error::new(io::ErrorKind::NotFound, "no such file");
        assert!(!NetworkErrors.should_retry(&missing));
    }

    #[test]
    fn test_unlisted_io_code_falls_back_to_message() {
        let unreachable = io::Error::new(io::ErrorKind::NetworkUnreachable, "boom");
        assert_eq!(unreachable.code().as_deref(), Some("ENETUNREACH"));
        assert!(!NetworkErrors.should_retry(&unreachable));

        let described = io::Error::new(io::ErrorKind::Other, "connection reset by peer");
        assert!(NetworkErrors.should_retry(&described));
    }

    #[test]
    fn test_boxed_error_downcasts_for_code() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(io::Error::new(io::ErrorKind::BrokenPipe, "write"));
        assert_eq!(boxed.code().as_deref(), Some("EPIPE"));
        assert!(NetworkErrors.should_retry(&boxed));

        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(OperationError::from_code("NETWORK_ERROR"));
        assert!(NetworkErrors.should_retry(&boxed));

        let boxed: Box<dyn std::error::Error + Send + Sync> = "bad input".into();
        assert!(!NetworkErrors.should_retry(&boxed));
    }

    #[test]
    fn test_closure_predicate() {
        let custom = |err: &OperationError| err.code.as_deref() == Some("CUSTOM_ERROR");
        assert!(custom.should_retry(&OperationError::from_code("CUSTOM_ERROR")));
        assert!(!custom.should_retry(&OperationError::new("network timeout")));
    }
}
