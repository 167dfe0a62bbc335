//! Durable job persistence (§4.6): claim with select-for-update-skip-locked,
//! heartbeat extension, completion, cancellation, and the scheduler's
//! idempotent enqueue.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use amtskern_core::{Job, JobId, JobKind, JobStatus, TenantId};

use crate::error::JobError;

/// Internal row shape for SQLx mapping; [`JobRow::into_job`] converts
/// database primitives (plain strings, JSON values) into the typed
/// domain row.
#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    tenant_id: Uuid,
    kind: String,
    payload: serde_json::Value,
    status: String,
    attempt: i32,
    max_attempts: i32,
    next_run: DateTime<Utc>,
    lease_owner: Option<String>,
    lease_expiry: Option<DateTime<Utc>>,
    last_heartbeat: Option<DateTime<Utc>>,
    result: Option<serde_json::Value>,
    error: Option<String>,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobRow {
    fn into_job(self) -> Job {
        Job {
            id: JobId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            kind: parse_kind(&self.kind),
            payload: self.payload,
            status: parse_status(&self.status),
            attempt: self.attempt.max(0) as u32,
            max_attempts: self.max_attempts.max(0) as u32,
            next_run: self.next_run,
            lease_owner: self.lease_owner,
            lease_expiry: self.lease_expiry,
            last_heartbeat: self.last_heartbeat,
            result: self.result,
            error: self.error,
            idempotency_key: self.idempotency_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn kind_str(kind: JobKind) -> &'static str {
    match kind {
        JobKind::DocumentAnalysis => "document_analysis",
        JobKind::DataboxSync => "databox_sync",
        JobKind::DeadlineReminder => "deadline_reminder",
        JobKind::WatchlistCheck => "watchlist_check",
        JobKind::SessionCleanup => "session_cleanup",
        JobKind::WebhookDelivery => "webhook_delivery",
        JobKind::AuditArchive => "audit_archive",
    }
}

fn parse_kind(raw: &str) -> JobKind {
    match raw {
        "document_analysis" => JobKind::DocumentAnalysis,
        "databox_sync" => JobKind::DataboxSync,
        "deadline_reminder" => JobKind::DeadlineReminder,
        "watchlist_check" => JobKind::WatchlistCheck,
        "session_cleanup" => JobKind::SessionCleanup,
        "webhook_delivery" => JobKind::WebhookDelivery,
        "audit_archive" => JobKind::AuditArchive,
        other => unreachable!("database contained an unknown job kind {other}; schema and enum have drifted"),
    }
}

fn parse_status(raw: &str) -> JobStatus {
    match raw {
        "pending" => JobStatus::Pending,
        "running" => JobStatus::Running,
        "succeeded" => JobStatus::Succeeded,
        "failed" => JobStatus::Failed,
        "cancelled" => JobStatus::Cancelled,
        other => unreachable!("database contained an unknown job status {other}; schema and enum have drifted"),
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, kind, payload, status, attempt, max_attempts, next_run,
         lease_owner, lease_expiry, last_heartbeat, result, error, idempotency_key,
         created_at, updated_at";

/// Postgres-backed job queue (§4.6, §6: "one row per job").
#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue with an idempotency key (§4.6): the scheduler's repeated
    /// schedule ticks upsert rather than insert, so ticking twice in a
    /// row never duplicates a pending job.
    pub async fn enqueue(
        &self,
        tenant_id: TenantId,
        kind: JobKind,
        payload: serde_json::Value,
        next_run: DateTime<Utc>,
        max_attempts: u32,
        idempotency_key: Option<&str>,
    ) -> Result<JobId, JobError> {
        let id = Uuid::new_v4();
        let row: (Uuid,) = sqlx::query_as(
            "INSERT INTO jobs (id, tenant_id, kind, payload, status, attempt, max_attempts, next_run, created_at, updated_at)
             VALUES ($1, $2, $3, $4, 'pending', 0, $5, $6, now(), now())
             ON CONFLICT (idempotency_key) WHERE idempotency_key IS NOT NULL DO UPDATE SET next_run = EXCLUDED.next_run
             RETURNING id",
        )
        .bind(id)
        .bind(tenant_id.as_uuid())
        .bind(kind_str(kind))
        .bind(&payload)
        .bind(max_attempts as i32)
        .bind(next_run)
        .bind(idempotency_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(JobId::from_uuid(row.0))
    }

    /// Atomically claim up to `limit` due jobs, using
    /// `FOR UPDATE SKIP LOCKED` so two workers never claim the same
    /// row (§4.6). A job is claimable either because it is still
    /// `pending`, or because it is `running` with a lease that has
    /// expired — a worker that died without heartbeating leaves its
    /// claim behind exactly this way, and the next `claim` elsewhere
    /// must be able to pick the row back up (§8 scenario G).
    pub async fn claim(&self, worker_id: &str, limit: i64, lease_duration: ChronoDuration) -> Result<Vec<Job>, JobError> {
        let now = Utc::now();
        let lease_expiry = now + lease_duration;

        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            "WITH claimable AS (
                 SELECT id FROM jobs
                 WHERE next_run <= $1
                   AND (
                       status = 'pending'
                       OR (status = 'running' AND lease_expiry IS NOT NULL AND lease_expiry <= $1)
                   )
                 ORDER BY next_run
                 FOR UPDATE SKIP LOCKED
                 LIMIT $2
             )
             UPDATE jobs
             SET status = 'running', lease_owner = $3, lease_expiry = $4, last_heartbeat = $1, updated_at = $1
             FROM claimable
             WHERE jobs.id = claimable.id
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(now)
        .bind(limit)
        .bind(worker_id)
        .bind(lease_expiry)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(JobRow::into_job).collect())
    }

    /// Extend a running job's lease. A worker that misses enough
    /// heartbeats for the lease to expire loses ownership silently —
    /// the next `claim` elsewhere picks the row back up (§4.6).
    pub async fn heartbeat(&self, job_id: JobId, worker_id: &str, lease_duration: ChronoDuration) -> Result<(), JobError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE jobs SET lease_expiry = $1, last_heartbeat = $2, updated_at = $2
             WHERE id = $3 AND lease_owner = $4 AND status = 'running'",
        )
        .bind(now + lease_duration)
        .bind(now)
        .bind(job_id.as_uuid())
        .bind(worker_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.heartbeat_failure_reason(job_id).await);
        }
        Ok(())
    }

    /// Distinguishes "cancelled out from under me" from an ordinary
    /// stale lease after a failed heartbeat, so the worker can tell its
    /// handler to abandon the attempt rather than merely losing the
    /// lease silently (§4.6).
    async fn heartbeat_failure_reason(&self, job_id: JobId) -> JobError {
        let status: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as("SELECT status FROM jobs WHERE id = $1").bind(job_id.as_uuid()).fetch_optional(&self.pool).await;
        match status {
            Ok(Some((status,))) if status == "cancelled" => JobError::Cancelled(job_id.to_string()),
            _ => JobError::NotLeased(job_id.to_string()),
        }
    }

    /// Record success (§4.6).
    pub async fn complete_success(&self, job_id: JobId, worker_id: &str, result: serde_json::Value) -> Result<(), JobError> {
        let affected = sqlx::query(
            "UPDATE jobs SET status = 'succeeded', result = $1, updated_at = now()
             WHERE id = $2 AND lease_owner = $3 AND status = 'running'",
        )
        .bind(&result)
        .bind(job_id.as_uuid())
        .bind(worker_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(JobError::NotLeased(job_id.to_string()));
        }
        Ok(())
    }

    /// Record failure (§4.6): retryable errors return the job to
    /// `pending` with a backed-off `next_run`; otherwise the job is
    /// marked `failed` with the error persisted.
    pub async fn complete_failure(&self, job_id: JobId, worker_id: &str, error: &str, retryable: bool, backoff: ChronoDuration) -> Result<(), JobError> {
        let affected = if retryable {
            sqlx::query(
                "UPDATE jobs
                 SET attempt = attempt + 1,
                     status = CASE WHEN attempt + 1 < max_attempts THEN 'pending' ELSE 'failed' END,
                     next_run = CASE WHEN attempt + 1 < max_attempts THEN $1 ELSE next_run END,
                     error = $2,
                     lease_owner = CASE WHEN attempt + 1 < max_attempts THEN NULL ELSE lease_owner END,
                     lease_expiry = CASE WHEN attempt + 1 < max_attempts THEN NULL ELSE lease_expiry END,
                     updated_at = now()
                 WHERE id = $3 AND lease_owner = $4 AND status = 'running'",
            )
            .bind(Utc::now() + backoff)
            .bind(error)
            .bind(job_id.as_uuid())
            .bind(worker_id)
            .execute(&self.pool)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                "UPDATE jobs SET status = 'failed', attempt = attempt + 1, error = $1, updated_at = now()
                 WHERE id = $2 AND lease_owner = $3 AND status = 'running'",
            )
            .bind(error)
            .bind(job_id.as_uuid())
            .bind(worker_id)
            .execute(&self.pool)
            .await?
            .rows_affected()
        };

        if affected == 0 {
            return Err(JobError::NotLeased(job_id.to_string()));
        }
        Ok(())
    }

    /// Cancel a job; a running worker observes this through its own
    /// polling of job status, not a forced interrupt (§4.6).
    pub async fn cancel(&self, job_id: JobId) -> Result<(), JobError> {
        let affected = sqlx::query("UPDATE jobs SET status = 'cancelled', updated_at = now() WHERE id = $1 AND status IN ('pending', 'running')")
            .bind(job_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(JobError::NotFound(job_id.to_string()));
        }
        Ok(())
    }

    pub async fn get(&self, job_id: JobId) -> Result<Job, JobError> {
        let row: Option<JobRow> = sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(job_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobRow::into_job).ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }
}
