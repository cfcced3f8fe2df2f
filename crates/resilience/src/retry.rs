//! Retry loop.
//!
//! Only failures whose [`Retryable::is_retryable`] is true are attempted
//! again; everything else, including an open circuit, ends the loop with
//! the original error.

use std::fmt;
use std::future::Future;

use crate::backoff;
use crate::config::RetryConfig;
use crate::error::{ResilienceError, Retryable};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: String,
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(name: impl Into<String>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `attempt_fn` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` attempts have been made.
    ///
    /// `attempt_fn` receives the 1-based attempt number.
    pub async fn execute<T, E, F, Fut>(&self, mut attempt_fn: F) -> Result<T, ResilienceError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ResilienceError<E>>>,
        E: Retryable + fmt::Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match attempt_fn(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    name = %self.name,
                    attempts = attempt,
                    error = %err,
                    "retries exhausted"
                );
                return Err(ResilienceError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = backoff::delay_for(&self.config.backoff, attempt);
            metrics::counter!("retry_attempts_total", "name" => self.name.clone()).increment(1);
            tracing::debug!(
                name = %self.name,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
