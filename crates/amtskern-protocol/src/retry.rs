//! Bounded retry with the fixed backoff schedule from §4.4.
//!
//! Mirrors the shape of a plain exponential-backoff retry loop, but
//! the delays are the literal schedule the specification names rather
//! than a computed series, and retry is gated on
//! [`ProtocolError::retryability`] rather than "any transport error".

use std::time::Duration;

use crate::cancellation::CancellationToken;
use crate::error::{ProtocolError, Retryability};

/// Backoff schedule from §4.4: three additional attempts after the
/// initial call, at 1s, 5s, then 30s.
const BACKOFF: [Duration; 3] = [Duration::from_secs(1), Duration::from_secs(5), Duration::from_secs(30)];

/// Run `f` up to `1 + BACKOFF.len()` times total (testable property 9,
/// §8). Retries only on [`Retryability::Retryable`] errors; any other
/// error — including a maintenance/cancellation short-circuit —
/// returns immediately. A cancelled token stops the loop at its next
/// sleep boundary without making a further attempt.
pub async fn retry_send<F, Fut, T>(cancellation: &CancellationToken, f: F) -> Result<T, ProtocolError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProtocolError>>,
{
    let mut last_err = None;
    for (attempt, delay) in std::iter::once(None).chain(BACKOFF.iter().copied().map(Some)).enumerate() {
        if let Some(delay) = delay {
            if cancellation.is_cancelled() {
                return Err(last_err.unwrap_or(ProtocolError::Cancelled));
            }
            tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying protocol call");
            tokio::time::sleep(delay).await;
            if cancellation.is_cancelled() {
                return Err(ProtocolError::Cancelled);
            }
        }

        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if e.retryability() == Retryability::Terminal {
                    return Err(e);
                }
                last_err = Some(e);
            }
        }
    }
    Err(last_err.expect("loop always runs at least once"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Scenario D of §8: HTTP 503 four times in a row means 1 + 3
    /// attempts total.
    #[tokio::test(start_paused = true)]
    async fn exhausts_retry_budget_on_repeated_transient_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancellation = CancellationToken::new();

        let result: Result<(), ProtocolError> = retry_send(&cancellation, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProtocolError::ServerError(503))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn terminal_error_makes_exactly_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancellation = CancellationToken::new();

        let result: Result<(), ProtocolError> = retry_send(&cancellation, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProtocolError::Rejected {
                    code: "ALREADY-REGISTERED".into(),
                    message: "x".into(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_at_the_next_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let result: Result<(), ProtocolError> = retry_send(&cancellation, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProtocolError::ServerError(503))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
