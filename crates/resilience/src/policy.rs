//! Retry, circuit breaker and time limiter composed around one call site.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{ConfigError, ResilienceConfig};
use crate::error::{ResilienceError, Retryable};
use crate::retry::RetryPolicy;
use crate::timeout::with_timeout;

/// Protects calls to one dependency.
///
/// Each retry attempt asks the circuit breaker for a permit and runs under
/// the attempt timeout. The breaker is shared: clones of the `Arc` returned
/// by [`Resilience::breaker`] observe the same statistics.
#[derive(Debug, Clone)]
pub struct Resilience {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
    attempt_timeout: Duration,
}

impl Resilience {
    /// Validates `config` and builds the policies with a fresh breaker.
    pub fn new(name: impl Into<String>, config: &ResilienceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let breaker = Arc::new(CircuitBreaker::new(name, config.circuit_breaker.clone()));
        Ok(Self::with_breaker(config, breaker))
    }

    /// Builds the policies around an existing, possibly shared, breaker.
    ///
    /// The breaker keeps its own configuration; only the retry and timeout
    /// settings are taken from `config`.
    pub fn with_breaker(config: &ResilienceConfig, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            retry: RetryPolicy::new(breaker.name(), config.retry.clone()),
            breaker,
            attempt_timeout: config.attempt_timeout,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Calls `operation` under the retry, circuit breaker and timeout policies.
    ///
    /// `operation` is invoked once per permitted attempt and never when the
    /// breaker rejects the attempt. Every error, retryable or not, counts as
    /// a breaker failure.
    pub async fn call<T, E, F, Fut>(&self, mut operation: F) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let start = tokio::time::Instant::now();
        let limit = self.attempt_timeout;

        let result = self
            .retry
            .execute(|attempt| {
                let breaker = Arc::clone(&self.breaker);
                let permit = breaker.try_acquire();
                let call = permit.is_some().then(&mut operation);

                async move {
                    let (Some(permit), Some(call)) = (permit, call) else {
                        return Err(ResilienceError::CircuitOpen {
                            name: breaker.name().to_string(),
                        });
                    };

                    tracing::trace!(circuit = %breaker.name(), attempt, "calling dependency");
                    let result = with_timeout(limit, call).await;
                    match &result {
                        Ok(_) => permit.record_success(),
                        Err(_) => permit.record_failure(),
                    }
                    result
                }
            })
            .await;

        metrics::histogram!(
            "resilience_call_duration_seconds",
            "name" => self.breaker.name().to_string()
        )
        .record(start.elapsed().as_secs_f64());

        result
    }
}
