//! Retry policy types and configuration.

use std::fmt;
use std::time::Duration;

use super::classify::NetworkErrors;
use super::error::ConfigError;
use super::jitter::Jitter;

/// Share of the capped delay spanned by jitter (±12.5% around the cap).
const JITTER_SPAN: f64 = 0.25;

/// A retry policy describing how to retry failed operations.
///
/// Policies are pure data: they describe retry behavior but don't execute it.
/// `P` is the retry condition; it defaults to [`NetworkErrors`].
///
/// # Defaults
///
/// | field            | default            |
/// |------------------|--------------------|
/// | `max_attempts`   | 3                  |
/// | `base_delay`     | 1000 ms            |
/// | `max_delay`      | 10000 ms           |
/// | `backoff_factor` | 2.0                |
/// | retry condition  | [`NetworkErrors`]  |
/// | jitter           | [`Jitter::Random`] |
///
/// Only `max_attempts` is validated (it must be at least 1). Everything else is
/// used as given; a `max_delay` below `base_delay` simply caps every delay.
///
/// # Examples
///
/// ```rust
/// use rebound::{OperationError, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_max_attempts(2)
///     .with_base_delay(Duration::from_millis(10))
///     .with_retry_condition(|err: &OperationError| {
///         err.code.as_deref() == Some("CUSTOM_ERROR")
///     });
///
/// assert_eq!(policy.max_attempts(), 2);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct RetryPolicy<P = NetworkErrors> {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    retry_condition: P,
    jitter: Jitter,
}

impl Default for RetryPolicy<NetworkErrors> {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
            retry_condition: NetworkErrors,
            jitter: Jitter::Random,
        }
    }
}

impl RetryPolicy<NetworkErrors> {
    /// The default policy; same as [`RetryPolicy::default`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P> RetryPolicy<P> {
    /// Set the total number of attempts, including the first.
    ///
    /// Zero is accepted here and rejected by [`validate`](Self::validate) when
    /// the policy is executed.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the second attempt.
    pub fn with_base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    /// Set the cap applied to the exponential delay before jitter.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set the multiplier applied once per retry.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Replace the retry condition entirely.
    ///
    /// The default network classifier is not consulted afterwards.
    pub fn with_retry_condition<P2>(self, retry_condition: P2) -> RetryPolicy<P2> {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_factor: self.backoff_factor,
            retry_condition,
            jitter: self.jitter,
        }
    }

    /// Set the random source used for jitter.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Get the total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the delay before the second attempt.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Get the delay cap.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Get the backoff multiplier.
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Get the retry condition.
    pub fn retry_condition(&self) -> &P {
        &self.retry_condition
    }

    /// Get the jitter source.
    pub fn jitter(&self) -> &Jitter {
        &self.jitter
    }

    /// Check that the policy can run at least one attempt.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            Err(ConfigError::NonPositiveMaxAttempts)
        } else {
            Ok(())
        }
    }

    /// The delay after `attempt` (1-indexed) before jitter is applied.
    ///
    /// `base_delay * backoff_factor^(attempt - 1)`, capped at `max_delay`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rebound::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default()
    ///     .with_base_delay(Duration::from_millis(100))
    ///     .with_max_delay(Duration::from_millis(500));
    ///
    /// assert_eq!(policy.capped_delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.capped_delay(2), Duration::from_millis(200));
    /// assert_eq!(policy.capped_delay(3), Duration::from_millis(400));
    /// assert_eq!(policy.capped_delay(4), Duration::from_millis(500)); // capped
    /// ```
    pub fn capped_delay(&self, attempt: u32) -> Duration {
        secs_to_duration(self.capped_secs(attempt))
    }

    /// The delay to sleep after `attempt` (1-indexed) failed.
    ///
    /// Draws one sample from the policy's jitter source. The result always
    /// lies in `[0, max_delay * 1.125)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rebound::{Jitter, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default()
    ///     .with_base_delay(Duration::from_millis(100))
    ///     .with_jitter(Jitter::None);
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let capped = self.capped_secs(attempt);
        let jitter = capped * JITTER_SPAN * (self.jitter.sample() - 0.5);
        let delay = (capped + jitter).max(0.0);

        debug_event!(
            attempt,
            base_delay_ms = self.base_delay.as_millis() as u64,
            capped_delay_ms = capped * 1000.0,
            delay_ms = delay * 1000.0,
            "delay calculated"
        );

        secs_to_duration(delay)
    }

    fn capped_secs(&self, attempt: u32) -> f64 {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let exponential = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        // NaN (a NaN factor, or a zero base times an infinite factor) means no wait.
        if exponential.is_nan() {
            return 0.0;
        }
        exponential.min(self.max_delay.as_secs_f64())
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl<P> fmt::Debug for RetryPolicy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .field("retry_condition", &std::any::type_name::<P>())
            .field("jitter", &self.jitter)
            .finish()
    }
}
