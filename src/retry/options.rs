//! Options-bag configuration for retry policies.

use std::time::Duration;

use super::classify::NetworkErrors;
use super::error::ConfigError;
use super::policy::RetryPolicy;

/// Partial retry configuration; unset fields fall back to the defaults.
///
/// This mirrors the loosely-typed options object call sites tend to pass
/// around (and, with the `serde` feature, what a config file would hold).
/// `max_attempts` is signed so that a negative value read from configuration is
/// reported as a [`ConfigError`] instead of being silently wrapped.
///
/// # Examples
///
/// ```rust
/// use rebound::{RetryOptions, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryOptions {
///     max_attempts: Some(3),
///     base_delay_ms: Some(1000),
///     max_delay_ms: Some(5000),
///     backoff_factor: Some(2.0),
/// }
/// .into_policy()
/// .unwrap();
///
/// assert_eq!(policy.max_delay(), Duration::from_secs(5));
///
/// assert!(RetryOptions { max_attempts: Some(-1), ..Default::default() }
///     .into_policy()
///     .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RetryOptions {
    /// Total attempts including the first (default 3).
    pub max_attempts: Option<i64>,
    /// Delay before the second attempt in milliseconds (default 1000).
    pub base_delay_ms: Option<u64>,
    /// Cap on the computed delay in milliseconds (default 10000).
    pub max_delay_ms: Option<u64>,
    /// Multiplier applied once per retry (default 2).
    pub backoff_factor: Option<f64>,
}

impl RetryOptions {
    /// Build a validated policy with the default network retry condition.
    pub fn into_policy(self) -> Result<RetryPolicy<NetworkErrors>, ConfigError> {
        let defaults = RetryPolicy::default();

        let max_attempts = match self.max_attempts {
            None => defaults.max_attempts(),
            Some(n) if n <= 0 => return Err(ConfigError::NonPositiveMaxAttempts),
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        };

        let base_delay = self
            .base_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay());
        let max_delay = self
            .max_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay());
        let backoff_factor = self.backoff_factor.unwrap_or(defaults.backoff_factor());

        Ok(defaults
            .with_max_attempts(max_attempts)
            .with_base_delay(base_delay)
            .with_max_delay(max_delay)
            .with_backoff_factor(backoff_factor))
    }
}

impl TryFrom<RetryOptions> for RetryPolicy<NetworkErrors> {
    type Error = ConfigError;

    fn try_from(options: RetryOptions) -> Result<Self, Self::Error> {
        options.into_policy()
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn test_empty_options_match_default_policy() {
        let policy = RetryOptions::default().into_policy().unwrap();
        let defaults = RetryPolicy::default();

        assert_eq!(policy.max_attempts(), defaults.max_attempts());
        assert_eq!(policy.base_delay(), defaults.base_delay());
        assert_eq!(policy.max_delay(), defaults.max_delay());
        assert_eq!(policy.backoff_factor(), defaults.backoff_factor());
    }

    #[test]
    fn test_partial_options_keep_other_defaults() {
        let policy = RetryOptions {
            max_attempts: Some(5),
            base_delay_ms: Some(10),
            ..Default::default()
        }
        .into_policy()
        .unwrap();

        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.base_delay(), Duration::from_millis(10));
        assert_eq!(policy.max_delay(), Duration::from_millis(10_000));
        assert_eq!(policy.backoff_factor(), 2.0);
    }

    #[test]
    fn test_non_positive_max_attempts_rejected() {
        for n in [0, -1, i64::MIN] {
            let options = RetryOptions {
                max_attempts: Some(n),
                ..Default::default()
            };
            let result: Result<RetryPolicy, ConfigError> = options.try_into();
            assert_eq!(result.unwrap_err(), ConfigError::NonPositiveMaxAttempts);
        }
    }

    #[test]
    fn test_huge_max_attempts_saturates() {
        let policy = RetryOptions {
            max_attempts: Some(i64::MAX),
            ..Default::default()
        }
        .into_policy()
        .unwrap();
        assert_eq!(policy.max_attempts(), u32::MAX);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_options() {
        let options: RetryOptions =
            serde_json::from_str(r#"{"max_attempts": 2, "max_delay_ms": 50}"#).unwrap();
        assert_eq!(options.max_attempts, Some(2));
        assert_eq!(options.max_delay_ms, Some(50));
        assert_eq!(options.base_delay_ms, None);

        let policy = options.into_policy().unwrap();
        assert_eq!(policy.max_delay(), Duration::from_millis(50));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<RetryOptions, _> = serde_json::from_str(r#"{"retries": 2}"#);
        assert!(result.is_err());
    }
}
