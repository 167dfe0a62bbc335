//! The handler registry (§4.6): "Handler registration is static at
//! startup; unknown kinds mark a job failed with a distinct error."

use std::collections::HashMap;
use std::sync::Arc;

use amtskern_core::{Job, JobKind};
use amtskern_protocol::CancellationToken;
use async_trait::async_trait;

/// Outcome of one handler invocation. `Retryable` distinguishes a
/// transient failure (worth another attempt, subject to `max_attempts`
/// and backoff) from a permanent one.
pub enum HandlerOutcome {
    Success(serde_json::Value),
    RetryableFailure(String),
    PermanentFailure(String),
}

/// One job-kind handler. Implementations MUST be idempotent (§5):
/// at-least-once execution means a handler may run twice for the same
/// job after a lease expires mid-execution.
///
/// `cancellation` is the same per-job root signal described in §5; a
/// handler doing multi-step work should check
/// [`CancellationToken::is_cancelled`] between steps and return early
/// once it observes cancellation (§4.6: "a running worker observes
/// cancellation via its context and abandons the attempt"). A handler
/// with no natural checkpoint may ignore it.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job, cancellation: &CancellationToken) -> HandlerOutcome;
}

/// Static map from job kind to handler, built once at startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobKind, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: JobKind, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: JobKind) -> Option<&Arc<dyn JobHandler>> {
        self.handlers.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopHandler;

    #[async_trait]
    impl JobHandler for NoopHandler {
        async fn handle(&self, _job: &Job, _cancellation: &CancellationToken) -> HandlerOutcome {
            HandlerOutcome::Success(serde_json::json!({}))
        }
    }

    #[test]
    fn unregistered_kind_has_no_handler() {
        let registry = HandlerRegistry::new().register(JobKind::SessionCleanup, Arc::new(NoopHandler));
        assert!(registry.get(JobKind::SessionCleanup).is_some());
        assert!(registry.get(JobKind::WatchlistCheck).is_none());
    }
}
