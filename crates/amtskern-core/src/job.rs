//! Job-queue row shape (§3, §4.6).

use crate::ids::{JobId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a job (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// The closed set of job kinds the engine dispatches (§4.6). Handler
/// registration is static at startup; a kind outside this set cannot
/// be enqueued — `JobKind` has no "other" variant on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    DocumentAnalysis,
    DataboxSync,
    DeadlineReminder,
    WatchlistCheck,
    SessionCleanup,
    WebhookDelivery,
    AuditArchive,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DocumentAnalysis => "document-analysis",
            Self::DataboxSync => "databox-sync",
            Self::DeadlineReminder => "deadline-reminder",
            Self::WatchlistCheck => "watchlist-check",
            Self::SessionCleanup => "session-cleanup",
            Self::WebhookDelivery => "webhook-delivery",
            Self::AuditArchive => "audit-archive",
        };
        write!(f, "{s}")
    }
}

/// The job row (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub tenant_id: TenantId,
    pub kind: JobKind,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub attempt: u32,
    pub max_attempts: u32,
    pub next_run: DateTime<Utc>,
    pub lease_owner: Option<String>,
    pub lease_expiry: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    /// Idempotency key used by the scheduler's upsert (§4.6) so that
    /// repeated schedule ticks do not duplicate a pending row.
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Invariant (§3): a job leased by worker `W` with expiry `T` may
    /// only be completed by `W`, and only while `now < T`.
    pub fn is_leased_by(&self, owner: &str, now: DateTime<Utc>) -> bool {
        match (&self.lease_owner, self.lease_expiry) {
            (Some(o), Some(expiry)) => o == owner && now < expiry,
            _ => false,
        }
    }

    pub fn lease_expired(&self, now: DateTime<Utc>) -> bool {
        match self.lease_expiry {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}
