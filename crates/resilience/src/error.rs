//! Error types for protected calls.

use std::fmt;
use std::time::Duration;

/// Classifies a failure as transient (worth retrying) or not.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Failure of a call made through the resilience policies.
///
/// `E` is the error type of the wrapped call.
#[derive(Debug)]
pub enum ResilienceError<E> {
    /// The circuit breaker rejected the call; the remote was not invoked.
    CircuitOpen { name: String },

    /// A single attempt exceeded its time limit.
    Timeout { after: Duration },

    /// The wrapped call failed.
    Inner(E),

    /// Every permitted attempt failed with a retryable error.
    RetriesExhausted {
        attempts: u32,
        last: Box<ResilienceError<E>>,
    },
}

impl<E> ResilienceError<E> {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResilienceError::CircuitOpen { .. } => "circuit_open",
            ResilienceError::Timeout { .. } => "timeout",
            ResilienceError::Inner(_) => "rejected",
            ResilienceError::RetriesExhausted { .. } => "retries_exhausted",
        }
    }

    /// Returns true if the circuit breaker short-circuited the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }
}

impl<E: Retryable> Retryable for ResilienceError<E> {
    fn is_retryable(&self) -> bool {
        match self {
            ResilienceError::CircuitOpen { .. } => false,
            ResilienceError::Timeout { .. } => true,
            ResilienceError::Inner(e) => e.is_retryable(),
            ResilienceError::RetriesExhausted { .. } => false,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ResilienceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResilienceError::CircuitOpen { name } => {
                write!(f, "CircuitBreaker '{name}' is OPEN and does not permit further calls")
            }
            ResilienceError::Timeout { after } => {
                write!(f, "call timed out after {}ms", after.as_millis())
            }
            ResilienceError::Inner(e) => write!(f, "{e}"),
            ResilienceError::RetriesExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
        }
    }
}

impl<E> std::error::Error for ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResilienceError::Inner(e) => Some(e),
            ResilienceError::RetriesExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}
