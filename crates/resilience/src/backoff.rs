//! Delay between retry attempts, with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::BackoffConfig;

/// Delay before retry number `retry` (1-based), without jitter.
pub fn base_delay(config: &BackoffConfig, retry: u32) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
    let scaled = config.initial_interval.as_nanos() as f64 * config.multiplier.powi(exponent);
    if !scaled.is_finite() || scaled >= config.max_interval.as_nanos() as f64 {
        return config.max_interval;
    }

    Duration::from_nanos(scaled.round() as u64)
}

/// Delay before retry number `retry`, with jitter applied when enabled.
pub fn delay_for(config: &BackoffConfig, retry: u32) -> Duration {
    let delay = base_delay(config, retry);
    if !config.jitter {
        return delay;
    }

    // Jitter is 0 to 10% of the delay
    let jitter_range = delay.as_millis() as u64 / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };

    delay + Duration::from_millis(jitter)
}

/// Longest delay [`delay_for`] can return for `retry`.
pub fn max_delay(config: &BackoffConfig, retry: u32) -> Duration {
    let delay = base_delay(config, retry);
    if config.jitter {
        delay + Duration::from_millis(delay.as_millis() as u64 / 10)
    } else {
        delay
    }
}
