//! Policy configuration.
//!
//! Every field has a default so callers only override what they need.
//! [`ResilienceConfig::validate`] performs the semantic checks; nothing is
//! validated at construction time.

use std::time::Duration;

use thiserror::Error;

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Delay between retry attempts.
///
/// The delay before retry `n` (1-based) is
/// `initial_interval * multiplier^(n-1)`, capped at `max_interval`.
/// A multiplier of `1.0` gives a fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    /// Adds up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl BackoffConfig {
    /// A fixed delay between attempts.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            multiplier: 1.0,
            max_interval: interval,
            jitter: false,
        }
    }

    /// An exponentially growing delay, capped at `max_interval`.
    pub fn exponential(initial_interval: Duration, multiplier: f64, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier,
            max_interval,
            jitter: false,
        }
    }

    /// Enables jitter.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(2))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first call.
    pub max_attempts: u32,
    pub backoff: BackoffConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Circuit breaker thresholds.
///
/// The window is count based: it holds the outcomes of the last
/// `sliding_window_size` calls made while the circuit was closed.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0, 100] at or above which the circuit opens.
    pub failure_rate_threshold: f64,
    pub sliding_window_size: usize,
    /// Outcomes required in the window before the rate is evaluated.
    pub minimum_number_of_calls: usize,
    pub wait_duration_in_open_state: Duration,
    pub permitted_calls_in_half_open_state: u32,
    /// Successful trials required to close the circuit again.
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            wait_duration_in_open_state: Duration::from_secs(5),
            permitted_calls_in_half_open_state: 3,
            half_open_success_threshold: 3,
        }
    }
}

/// Full configuration for one protected call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            attempt_timeout: Duration::from_secs(3),
        }
    }
}

impl ResilienceConfig {
    /// Checks that every value is usable, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }

        let backoff = &retry.backoff;
        if !backoff.multiplier.is_finite() || backoff.multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "retry.backoff.multiplier",
                format!("{} (must be finite and >= 1.0)", backoff.multiplier),
            ));
        }
        if backoff.max_interval < backoff.initial_interval {
            return Err(ConfigError::invalid(
                "retry.backoff.max_interval",
                "must not be shorter than initial_interval",
            ));
        }

        let cb = &self.circuit_breaker;
        if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 100.0) {
            return Err(ConfigError::invalid(
                "circuit_breaker.failure_rate_threshold",
                format!("{} (must be in (0, 100])", cb.failure_rate_threshold),
            ));
        }
        if cb.sliding_window_size == 0 {
            return Err(ConfigError::invalid(
                "circuit_breaker.sliding_window_size",
                "must be at least 1",
            ));
        }
        if cb.minimum_number_of_calls == 0 || cb.minimum_number_of_calls > cb.sliding_window_size {
            return Err(ConfigError::invalid(
                "circuit_breaker.minimum_number_of_calls",
                format!(
                    "{} (must be between 1 and sliding_window_size {})",
                    cb.minimum_number_of_calls, cb.sliding_window_size
                ),
            ));
        }
        if cb.permitted_calls_in_half_open_state == 0 {
            return Err(ConfigError::invalid(
                "circuit_breaker.permitted_calls_in_half_open_state",
                "must be at least 1",
            ));
        }
        if cb.half_open_success_threshold == 0
            || cb.half_open_success_threshold > cb.permitted_calls_in_half_open_state
        {
            return Err(ConfigError::invalid(
                "circuit_breaker.half_open_success_threshold",
                format!(
                    "{} (must be between 1 and permitted_calls_in_half_open_state {})",
                    cb.half_open_success_threshold, cb.permitted_calls_in_half_open_state
                ),
            ));
        }

        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::invalid("attempt_timeout", "must be greater than zero"));
        }

        Ok(())
    }

    /// Longest time a protected call can take before its result is known.
    ///
    /// Every attempt may run to its timeout, and every retry waits the
    /// longest possible backoff (including jitter).
    pub fn max_call_duration(&self) -> Duration {
        let attempts = self.retry.max_attempts;
        let mut total = self.attempt_timeout.saturating_mul(attempts);
        for retry in 1..attempts {
            total = total.saturating_add(crate::backoff::max_delay(&self.retry.backoff, retry));
        }
        total
    }
}
