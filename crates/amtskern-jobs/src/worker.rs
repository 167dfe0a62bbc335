//! The poll-claim-execute loop (§4.6): a worker polls at a configured
//! interval, claims available jobs, dispatches each to its registered
//! handler, and extends its lease with periodic heartbeats while the
//! handler runs.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use amtskern_protocol::CancellationToken;
use chrono::Duration as ChronoDuration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::handler::{HandlerOutcome, HandlerRegistry};
use crate::store::JobStore;

pub struct WorkerConfig {
    pub worker_id: String,
    pub poll_interval: StdDuration,
    pub lease_duration: ChronoDuration,
    /// Must be shorter than `lease_duration` so a live worker never
    /// loses its own lease (§4.6).
    pub heartbeat_interval: StdDuration,
    pub claim_batch_size: i64,
    /// Bound on how long shutdown waits for in-flight jobs before
    /// abandoning them to lease expiry (§4.6).
    pub shutdown_timeout: StdDuration,
}

pub struct Worker {
    store: JobStore,
    registry: HandlerRegistry,
    config: WorkerConfig,
    in_flight: Mutex<JoinSet<()>>,
}

impl Worker {
    pub fn new(store: JobStore, registry: HandlerRegistry, config: WorkerConfig) -> Self {
        Self {
            store,
            registry,
            config,
            in_flight: Mutex::new(JoinSet::new()),
        }
    }

    /// Run until `shutdown` resolves. Stops claiming immediately on
    /// shutdown, then waits up to `shutdown_timeout` for in-flight
    /// jobs spawned by earlier ticks to finish (§4.6): "waits (bounded
    /// by a shutdown timeout) for in-flight jobs to finish or
    /// heartbeats to lapse, and exits."
    pub async fn run(self: Arc<Self>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    self.clone().poll_once().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(worker_id = %self.config.worker_id, "worker stopped claiming new jobs, draining in-flight work");

        let mut in_flight = self.in_flight.lock().await;
        let drain = async {
            while in_flight.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.config.shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                worker_id = %self.config.worker_id,
                remaining = in_flight.len(),
                "shutdown timeout elapsed with jobs still in flight; abandoning them to lease expiry"
            );
            in_flight.abort_all();
        }
    }

    async fn poll_once(self: Arc<Self>) {
        let jobs = match self.store.claim(&self.config.worker_id, self.config.claim_batch_size, self.config.lease_duration).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "failed to claim jobs");
                return;
            }
        };

        let mut in_flight = self.in_flight.lock().await;
        for job in jobs {
            let this = self.clone();
            in_flight.spawn(async move { this.execute(job).await });
        }
    }

    async fn execute(&self, job: amtskern_core::Job) {
        let Some(handler) = self.registry.get(job.kind) else {
            let _ = self
                .store
                .complete_failure(job.id, &self.config.worker_id, &format!("no handler registered for kind {}", job.kind), false, ChronoDuration::zero())
                .await;
            return;
        };

        let cancellation = CancellationToken::new();
        let heartbeat_handle = self.spawn_heartbeat(job.id, cancellation.clone());
        let outcome = handler.handle(&job, &cancellation).await;
        heartbeat_handle.abort();

        if cancellation.is_cancelled() {
            tracing::info!(job_id = %job.id, "job was cancelled mid-execution, abandoning the attempt without recording an outcome");
            return;
        }

        let result = match outcome {
            HandlerOutcome::Success(value) => self.store.complete_success(job.id, &self.config.worker_id, value).await,
            HandlerOutcome::RetryableFailure(message) => {
                let backoff = retry_backoff(job.attempt + 1);
                self.store.complete_failure(job.id, &self.config.worker_id, &message, true, backoff).await
            }
            HandlerOutcome::PermanentFailure(message) => self.store.complete_failure(job.id, &self.config.worker_id, &message, false, ChronoDuration::zero()).await,
        };

        if let Err(e) = result {
            tracing::warn!(job_id = %job.id, error = %e, "failed to record job outcome, likely lost the lease mid-execution");
        }
    }

    /// Extends the job's lease on a timer; if a heartbeat fails because
    /// the job was cancelled out from under us, flips `cancellation` so
    /// [`Worker::execute`] abandons the attempt instead of recording an
    /// outcome against a row it no longer owns (§4.6).
    fn spawn_heartbeat(&self, job_id: amtskern_core::JobId, cancellation: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = self.store.clone();
        let worker_id = self.config.worker_id.clone();
        let interval = self.config.heartbeat_interval;
        let lease_duration = self.config.lease_duration;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match store.heartbeat(job_id, &worker_id, lease_duration).await {
                    Ok(()) => {}
                    Err(crate::error::JobError::Cancelled(_)) => {
                        cancellation.cancel();
                        break;
                    }
                    Err(_) => break,
                }
            }
        })
    }
}

/// Backoff applied to a retryable job failure. Unlike the protocol
/// client's fixed `[1s, 5s, 30s]` schedule (§4.4), job retries back off
/// exponentially without an upper bound on the schedule itself —
/// `max_attempts` is what eventually stops them (§4.6).
fn retry_backoff(attempt: u32) -> ChronoDuration {
    let seconds = 2u64.saturating_pow(attempt.min(10)).saturating_mul(5);
    ChronoDuration::seconds(seconds as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_with_attempt_number() {
        assert!(retry_backoff(2) > retry_backoff(1));
        assert!(retry_backoff(1) > retry_backoff(0));
    }
}
