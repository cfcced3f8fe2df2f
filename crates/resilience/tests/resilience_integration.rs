//! Integration tests for the composed resilience policies.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use resilience::{
    BackoffConfig, CircuitBreakerConfig, CircuitState, Fallback, Resilience, ResilienceConfig,
    ResilienceError, RetryConfig, Retryable,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum RemoteError {
    Network,
    BadRequest,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Network => f.write_str("connection refused"),
            RemoteError::BadRequest => f.write_str("bad request"),
        }
    }
}

impl Retryable for RemoteError {
    fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::Network)
    }
}

/// Fake remote dependency that counts calls.
#[derive(Clone, Default)]
struct Remote {
    calls: Arc<AtomicU32>,
}

impl Remote {
    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, outcome: Result<bool, RemoteError>) -> Result<bool, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn hang(&self) -> Result<bool, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(true)
    }
}

fn config(max_attempts: u32) -> ResilienceConfig {
    ResilienceConfig {
        retry: RetryConfig {
            max_attempts,
            backoff: BackoffConfig::fixed(Duration::from_millis(10)),
        },
        circuit_breaker: CircuitBreakerConfig {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_number_of_calls: 10,
            wait_duration_in_open_state: Duration::from_secs(5),
            permitted_calls_in_half_open_state: 3,
            half_open_success_threshold: 3,
        },
        attempt_timeout: Duration::from_millis(100),
    }
}

/// Breaker that opens after four failed calls.
fn fragile_config() -> ResilienceConfig {
    let mut config = config(1);
    config.circuit_breaker.sliding_window_size = 4;
    config.circuit_breaker.minimum_number_of_calls = 4;
    config.circuit_breaker.permitted_calls_in_half_open_state = 2;
    config.circuit_breaker.half_open_success_threshold = 2;
    config
}

mod retry {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn n_failures_with_n_attempts_makes_exactly_n_calls() {
        for n in 1..=5 {
            let remote = Remote::default();
            let policy = Resilience::new("inventory", &config(n)).unwrap();

            let result = policy
                .call(|| remote.answer(Err(RemoteError::Network)))
                .await;

            assert!(
                matches!(result, Err(ResilienceError::RetriesExhausted { attempts, .. }) if attempts == n)
            );
            assert_eq!(remote.calls(), n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn negative_answer_is_not_retried() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &config(3)).unwrap();

        let result = policy.call(|| remote.answer(Ok(false))).await;

        assert!(!result.unwrap());
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_failure_is_not_retried() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &config(3)).unwrap();

        let result = policy
            .call(|| remote.answer(Err(RemoteError::BadRequest)))
            .await;

        assert!(matches!(
            result,
            Err(ResilienceError::Inner(RemoteError::BadRequest))
        ));
        assert_eq!(remote.calls(), 1);
        assert_eq!(policy.breaker().snapshot().failed_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_are_retried_and_bounded() {
        let remote = Remote::default();
        let config = config(3);
        let policy = Resilience::new("inventory", &config).unwrap();
        let start = tokio::time::Instant::now();

        let result = policy.call(|| remote.hang()).await;

        assert!(matches!(
            result,
            Err(ResilienceError::RetriesExhausted { attempts: 3, ref last })
                if matches!(**last, ResilienceError::Timeout { .. })
        ));
        assert_eq!(remote.calls(), 3);
        assert!(start.elapsed() <= config.max_call_duration() + Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_when_a_later_attempt_succeeds() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &config(3)).unwrap();

        let result = policy
            .call(|| {
                let outcome = if remote.calls() < 2 {
                    Err(RemoteError::Network)
                } else {
                    Ok(true)
                };
                remote.answer(outcome)
            })
            .await;

        assert!(result.unwrap());
        assert_eq!(remote.calls(), 3);
    }
}

mod circuit_breaker {
    use super::*;

    async fn trip(policy: &Resilience, remote: &Remote) {
        for _ in 0..4 {
            let _ = policy.call(|| remote.answer(Err(RemoteError::Network))).await;
        }
        assert_eq!(policy.breaker().state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn open_circuit_short_circuits_without_calling_remote() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &fragile_config()).unwrap();
        trip(&policy, &remote).await;
        let calls_before = remote.calls();

        let result = policy.call(|| remote.answer(Ok(true))).await;

        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
        assert_eq!(remote.calls(), calls_before);
    }

    #[tokio::test(start_paused = true)]
    async fn breaker_opening_mid_retry_stops_the_loop() {
        let remote = Remote::default();
        let mut config = fragile_config();
        config.retry.max_attempts = 10;
        let policy = Resilience::new("inventory", &config).unwrap();

        let result = policy
            .call(|| remote.answer(Err(RemoteError::Network)))
            .await;

        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
        assert_eq!(remote.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_lets_exactly_the_permitted_trials_through() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &fragile_config()).unwrap();
        trip(&policy, &remote).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let first = policy.breaker().try_acquire().expect("first trial");
        let second = policy.breaker().try_acquire().expect("second trial");
        let calls_before = remote.calls();

        let rejected = policy.call(|| remote.answer(Ok(true))).await;
        assert!(matches!(rejected, Err(ResilienceError::CircuitOpen { .. })));
        assert_eq!(remote.calls(), calls_before);

        first.record_success();
        second.record_success();
        assert_eq!(policy.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_trials_close_the_circuit() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &fragile_config()).unwrap();
        trip(&policy, &remote).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(policy.call(|| remote.answer(Ok(true))).await.unwrap());
        assert_eq!(policy.breaker().state(), CircuitState::HalfOpen);
        assert!(!policy.call(|| remote.answer(Ok(false))).await.unwrap());
        assert_eq!(policy.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trial_reopens_the_circuit() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &fragile_config()).unwrap();
        trip(&policy, &remote).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let _ = policy.call(|| remote.answer(Ok(true))).await;
        let _ = policy.call(|| remote.answer(Err(RemoteError::Network))).await;
        assert_eq!(policy.breaker().state(), CircuitState::Open);

        let calls_before = remote.calls();
        let result = policy.call(|| remote.answer(Ok(true))).await;
        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
        assert_eq!(remote.calls(), calls_before);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_trial_releases_its_permit() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &fragile_config()).unwrap();
        trip(&policy, &remote).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        // Abandon a trial while it waits on the remote.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), policy.call(|| remote.hang())).await;
        assert!(abandoned.is_err());
        assert_eq!(policy.breaker().snapshot().half_open_admitted, 0);

        assert!(policy.call(|| remote.answer(Ok(true))).await.unwrap());
        assert!(policy.call(|| remote.answer(Ok(true))).await.unwrap());
        assert_eq!(policy.breaker().state(), CircuitState::Closed);
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_outcomes_are_all_recorded() {
        let mut config = config(1);
        config.circuit_breaker.sliding_window_size = 1000;
        config.circuit_breaker.minimum_number_of_calls = 1000;
        let policy = Arc::new(Resilience::new("inventory", &config).unwrap());
        let remote = Remote::default();

        let mut handles = Vec::new();
        for i in 0..400u32 {
            let policy = policy.clone();
            let remote = remote.clone();
            handles.push(tokio::spawn(async move {
                let outcome = if i % 4 == 0 {
                    Err(RemoteError::BadRequest)
                } else {
                    Ok(true)
                };
                let _ = policy.call(|| remote.answer(outcome)).await;
            }));
        }
        for handle in futures_util::future::join_all(handles).await {
            handle.unwrap();
        }

        let snapshot = policy.breaker().snapshot();
        assert_eq!(remote.calls(), 400);
        assert_eq!(snapshot.buffered_calls, 400);
        assert_eq!(snapshot.failed_calls, 100);
        assert_eq!(snapshot.state, CircuitState::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_open_the_circuit_once() {
        let mut config = config(1);
        config.circuit_breaker.sliding_window_size = 20;
        config.circuit_breaker.minimum_number_of_calls = 20;
        config.circuit_breaker.wait_duration_in_open_state = Duration::from_secs(600);
        let policy = Arc::new(Resilience::new("inventory", &config).unwrap());
        let remote = Remote::default();

        let mut handles = Vec::new();
        for _ in 0..200 {
            let policy = policy.clone();
            let remote = remote.clone();
            handles.push(tokio::spawn(async move {
                policy
                    .call(|| remote.answer(Err(RemoteError::Network)))
                    .await
            }));
        }

        let mut short_circuited = 0;
        for handle in futures_util::future::join_all(handles).await {
            if handle.unwrap().is_err_and(|e| e.is_circuit_open()) {
                short_circuited += 1;
            }
        }

        assert_eq!(policy.breaker().state(), CircuitState::Open);
        assert_eq!(remote.calls() + short_circuited, 200);
        assert!(remote.calls() >= 20);
    }
}

mod fallback {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fallback_makes_the_call_total() {
        let remote = Remote::default();
        let policy = Resilience::new("inventory", &config(2)).unwrap();
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = reasons.clone();
        let fallback = Fallback::new("inventory", false).on_fallback(
            move |query: &(String, i32), reason: &str| {
                sink.lock()
                    .unwrap()
                    .push((query.0.clone(), query.1, reason.to_string()));
            },
        );

        let query = ("iphone_15".to_string(), 5);
        let result = policy
            .call(|| remote.answer(Err(RemoteError::Network)))
            .await;
        let answer = fallback.recover(&query, result);

        assert!(!answer);
        assert_eq!(remote.calls(), 2);
        let reasons = reasons.lock().unwrap();
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].0, "iphone_15");
        assert_eq!(reasons[0].1, 5);
        assert_eq!(
            reasons[0].2,
            "gave up after 2 attempts: connection refused"
        );
    }
}
