//! Circuit breaker shared by every call to one dependency.
//!
//! # States
//! - Closed: calls pass through, outcomes feed a count-based sliding window
//! - Open: calls are rejected without touching the dependency
//! - Half-Open: a fixed number of trial calls decide whether to close again
//!
//! # State Transitions
//! ```text
//! Closed    → Open:      failure rate >= threshold once the window holds
//!                        at least `minimum_number_of_calls` outcomes
//! Open      → Half-Open: first acquisition after the open wait elapses
//! Half-Open → Closed:    all trials reported, successes >= threshold
//! Half-Open → Open:      all trials reported, successes < threshold
//! ```
//!
//! All state lives behind one mutex that is never held across an `.await`,
//! so concurrent callers cannot lose an outcome or a transition. Each
//! transition bumps a generation counter; outcomes from permits issued in an
//! earlier generation are ignored.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the breaker statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    /// Outcomes currently held in the sliding window.
    pub buffered_calls: usize,
    pub failed_calls: usize,
    /// Failure percentage, once the window holds enough outcomes.
    pub failure_rate: Option<f64>,
    /// Trial calls admitted in the current half-open phase.
    pub half_open_admitted: u32,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open {
        opened_at: Instant,
    },
    HalfOpen {
        admitted: u32,
        successes: u32,
        failures: u32,
    },
}

impl Phase {
    fn state(&self) -> CircuitState {
        match self {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    generation: u64,
    /// `true` marks a failed call.
    window: VecDeque<bool>,
    failures: usize,
}

impl Inner {
    fn failure_rate(&self, minimum_calls: usize) -> Option<f64> {
        if self.window.len() < minimum_calls || self.window.is_empty() {
            return None;
        }
        Some(self.failures as f64 * 100.0 / self.window.len() as f64)
    }
}

/// Circuit breaker guarding a single dependency.
///
/// Share it through an `Arc`; permits keep the breaker alive until they
/// report.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed circuit breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let capacity = config.sliding_window_size;
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                generation: 0,
                window: VecDeque::with_capacity(capacity),
                failures: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    ///
    /// An open circuit whose wait has elapsed still reports `Open` until the
    /// next acquisition moves it to half-open.
    pub fn state(&self) -> CircuitState {
        self.lock().phase.state()
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            state: inner.phase.state(),
            buffered_calls: inner.window.len(),
            failed_calls: inner.failures,
            failure_rate: inner.failure_rate(self.config.minimum_number_of_calls),
            half_open_admitted: match inner.phase {
                Phase::HalfOpen { admitted, .. } => admitted,
                _ => 0,
            },
        }
    }

    /// Asks permission to make one call.
    ///
    /// Returns `None` when the circuit is open, or half-open with every trial
    /// slot taken. The returned permit must report the call outcome; dropping
    /// it unreported gives a half-open trial slot back.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CallPermit> {
        let mut inner = self.lock();

        let phase = inner.phase;
        if let Phase::Open { opened_at } = phase {
            if opened_at.elapsed() < self.config.wait_duration_in_open_state {
                drop(inner);
                self.reject();
                return None;
            }
            self.transition(
                &mut inner,
                Phase::HalfOpen {
                    admitted: 0,
                    successes: 0,
                    failures: 0,
                },
            );
        }

        let permitted = self.config.permitted_calls_in_half_open_state;
        let admitted = match &mut inner.phase {
            Phase::Closed => true,
            Phase::HalfOpen { admitted, .. } if *admitted < permitted => {
                *admitted += 1;
                true
            }
            _ => false,
        };

        if !admitted {
            drop(inner);
            self.reject();
            return None;
        }

        Some(CallPermit {
            breaker: Arc::clone(self),
            generation: inner.generation,
            settled: false,
        })
    }

    fn reject(&self) {
        metrics::counter!("circuit_breaker_calls_rejected_total", "name" => self.name.clone())
            .increment(1);
        tracing::debug!(circuit = %self.name, "call not permitted");
    }

    fn on_outcome(&self, generation: u64, failed: bool) {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::trace!(circuit = %self.name, failed, "ignoring outcome from earlier state");
            return;
        }

        let phase = inner.phase;
        match phase {
            Phase::Closed => self.record_closed(&mut inner, failed),
            Phase::HalfOpen { .. } => self.record_trial(&mut inner, failed),
            Phase::Open { .. } => {}
        }
    }

    fn on_abandoned(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        if let Phase::HalfOpen { admitted, .. } = &mut inner.phase {
            *admitted = admitted.saturating_sub(1);
            tracing::debug!(circuit = %self.name, "half-open trial abandoned");
        }
    }

    fn record_closed(&self, inner: &mut Inner, failed: bool) {
        inner.window.push_back(failed);
        if failed {
            inner.failures += 1;
        }
        if inner.window.len() > self.config.sliding_window_size
            && inner.window.pop_front() == Some(true)
        {
            inner.failures -= 1;
        }

        if let Some(rate) = inner.failure_rate(self.config.minimum_number_of_calls)
            && rate >= self.config.failure_rate_threshold
        {
            tracing::warn!(
                circuit = %self.name,
                failure_rate = rate,
                threshold = self.config.failure_rate_threshold,
                "failure rate threshold reached"
            );
            self.transition(
                inner,
                Phase::Open {
                    opened_at: Instant::now(),
                },
            );
        }
    }

    fn record_trial(&self, inner: &mut Inner, failed: bool) {
        let decision = match &mut inner.phase {
            Phase::HalfOpen {
                successes,
                failures,
                ..
            } => {
                if failed {
                    *failures += 1;
                } else {
                    *successes += 1;
                }
                (*successes + *failures >= self.config.permitted_calls_in_half_open_state)
                    .then_some(*successes >= self.config.half_open_success_threshold)
            }
            _ => None,
        };

        match decision {
            Some(true) => self.transition(inner, Phase::Closed),
            Some(false) => self.transition(
                inner,
                Phase::Open {
                    opened_at: Instant::now(),
                },
            ),
            None => {}
        }
    }

    fn transition(&self, inner: &mut Inner, to: Phase) {
        let from = inner.phase.state();
        inner.phase = to;
        inner.generation += 1;
        if matches!(to, Phase::Closed) {
            inner.window.clear();
            inner.failures = 0;
        }

        let to = to.state();
        metrics::counter!(
            "circuit_breaker_transitions_total",
            "name" => self.name.clone(),
            "to" => to.as_str()
        )
        .increment(1);

        if to == CircuitState::Open {
            tracing::warn!(circuit = %self.name, %from, %to, "circuit breaker state changed");
        } else {
            tracing::info!(circuit = %self.name, %from, %to, "circuit breaker state changed");
        }
    }
}

/// Permission to make one call through a [`CircuitBreaker`].
#[must_use = "a permit must report the outcome of the call"]
#[derive(Debug)]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    settled: bool,
}

impl CallPermit {
    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_outcome(self.generation, false);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_outcome(self.generation, true);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.on_abandoned(self.generation);
        }
    }
}
