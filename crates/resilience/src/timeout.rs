//! Per-attempt time limit.

use std::future::Future;
use std::time::Duration;

use crate::error::ResilienceError;

/// Runs `call` with an upper bound of `limit`.
///
/// The call future is dropped when the limit elapses.
pub async fn with_timeout<T, E, Fut>(limit: Duration, call: Fut) -> Result<T, ResilienceError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ResilienceError::Inner(e)),
        Err(_) => Err(ResilienceError::Timeout { after: limit }),
    }
}
