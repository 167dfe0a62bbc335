//! The cron-like scheduler (§4.6): "a second process inside the
//! engine that creates jobs on a cron-like schedule (deadline checks,
//! session cleanup) by upserting pending rows with an idempotency key
//! so repeated schedule ticks do not duplicate."

use std::time::Duration as StdDuration;

use amtskern_core::{JobKind, TenantId};

use crate::error::JobError;
use crate::store::JobStore;

/// One entry in the schedule: a job kind to enqueue for a tenant at a
/// fixed cadence, keyed so repeated ticks within the same period
/// collapse onto one row.
pub struct ScheduleEntry {
    pub tenant_id: TenantId,
    pub kind: JobKind,
    pub payload: serde_json::Value,
    pub max_attempts: u32,
    /// Idempotency key identifying this tick's occurrence, e.g.
    /// `"deadline-reminder:2024-11-15"`. Stable across repeated ticks
    /// for the same occurrence, distinct across occurrences.
    pub idempotency_key: String,
}

pub struct Scheduler {
    store: JobStore,
    tick_interval: StdDuration,
}

impl Scheduler {
    pub fn new(store: JobStore, tick_interval: StdDuration) -> Self {
        Self { store, tick_interval }
    }

    /// Run forever, calling `build_entries` on every tick to produce
    /// the current schedule's due entries and upserting each one.
    /// `build_entries` is a plain closure over wall-clock time rather
    /// than a trait object — the deadline logic itself lives in
    /// `amtskern-deadlines`, not here.
    pub async fn run<F>(&self, mut shutdown: tokio::sync::watch::Receiver<bool>, mut build_entries: F)
    where
        F: FnMut() -> Vec<ScheduleEntry>,
    {
        let mut ticker = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    for entry in build_entries() {
                        if let Err(e) = self.upsert(entry).await {
                            tracing::error!(error = %e, "scheduler tick failed to upsert a job");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    async fn upsert(&self, entry: ScheduleEntry) -> Result<(), JobError> {
        self.store
            .enqueue(
                entry.tenant_id,
                entry.kind,
                entry.payload,
                chrono::Utc::now(),
                entry.max_attempts,
                Some(&entry.idempotency_key),
            )
            .await?;
        Ok(())
    }
}
