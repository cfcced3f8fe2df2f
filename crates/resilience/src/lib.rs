//! Resilience policies for a single remote call site.
//!
//! A call is wrapped, from the outside in, as
//!
//! ```text
//! Fallback → Retry → CircuitBreaker → TimeLimiter → remote call
//! ```
//!
//! Every retry attempt goes through the circuit breaker, so an open circuit
//! stops the retry loop immediately. Whatever error survives the retry loop
//! is turned into a fixed value by [`Fallback`], which makes the wrapped call
//! a total function.

pub mod backoff;
pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod fallback;
pub mod policy;
pub mod retry;
pub mod timeout;

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitSnapshot, CircuitState};
pub use config::{BackoffConfig, CircuitBreakerConfig, ConfigError, ResilienceConfig, RetryConfig};
pub use error::{ResilienceError, Retryable};
pub use fallback::Fallback;
pub use policy::Resilience;
pub use retry::RetryPolicy;
pub use timeout::with_timeout;
