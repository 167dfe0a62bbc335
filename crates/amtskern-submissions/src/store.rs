//! Submission and line-item persistence (§3, §6: "one row per
//! submission... one row per line item").
//!
//! Mirrors the row-shape/mapping convention of `amtskern-jobs::store`:
//! a `#[derive(sqlx::FromRow)]` row type with plain-string/JSON columns,
//! converted into the typed domain row at the boundary.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use amtskern_core::{AccountId, Submission, SubmissionId, SubmissionKind, SubmissionPayload, SubmissionStatus, TenantId, UserId};

use crate::error::EngineError;

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    tenant_id: Uuid,
    account_id: Uuid,
    kind: String,
    payload: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: Uuid,
    request_xml: Option<String>,
    response_xml: Option<String>,
    protocol_number: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    corrects_id: Option<Uuid>,
    is_correction: bool,
    retried: bool,
    original_submission_id: Option<Uuid>,
}

impl SubmissionRow {
    fn into_submission(self) -> Result<Submission, EngineError> {
        let payload: SubmissionPayload = serde_json::from_value(self.payload)
            .map_err(|e| amtskern_core::DomainError::ValidationSchema(format!("stored payload failed to deserialize: {e}")))?;
        Ok(Submission {
            id: SubmissionId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            account_id: AccountId::from_uuid(self.account_id),
            payload,
            status: parse_status(&self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: UserId::from_uuid(self.created_by),
            request_xml: self.request_xml,
            response_xml: self.response_xml,
            protocol_number: self.protocol_number,
            error_code: self.error_code,
            error_message: self.error_message,
            submitted_at: self.submitted_at,
            corrects_id: self.corrects_id.map(SubmissionId::from_uuid),
            is_correction: self.is_correction,
            retried: self.retried,
            original_submission_id: self.original_submission_id.map(SubmissionId::from_uuid),
        })
    }
}

fn kind_str(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Registration => "registration",
        SubmissionKind::Deregistration => "deregistration",
        SubmissionKind::Change => "change",
        SubmissionKind::AnnualTaxForm => "annual_tax_form",
        SubmissionKind::MonthlyContributionReport => "monthly_contribution_report",
        SubmissionKind::TaxReturn => "tax_return",
    }
}

fn status_str(status: SubmissionStatus) -> &'static str {
    match status {
        SubmissionStatus::Draft => "draft",
        SubmissionStatus::Validated => "validated",
        SubmissionStatus::Submitted => "submitted",
        SubmissionStatus::Accepted => "accepted",
        SubmissionStatus::Rejected => "rejected",
    }
}

fn parse_status(raw: &str) -> SubmissionStatus {
    match raw {
        "draft" => SubmissionStatus::Draft,
        "validated" => SubmissionStatus::Validated,
        "submitted" => SubmissionStatus::Submitted,
        "accepted" => SubmissionStatus::Accepted,
        "rejected" => SubmissionStatus::Rejected,
        other => unreachable!("database contained an unknown submission status {other}; schema and enum have drifted"),
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, account_id, kind, payload, status, created_at, updated_at, created_by,
         request_xml, response_xml, protocol_number, error_code, error_message, submitted_at,
         corrects_id, is_correction, retried, original_submission_id";

/// Postgres-backed submission store (§6). Row-level tenant isolation
/// (§3, §5) is enforced by the session's `app.tenant_id` variable set
/// at connection check-out, outside this crate; every query here still
/// binds `tenant_id` explicitly so a bug in that policy layer cannot
/// by itself leak a row across tenants.
#[derive(Clone)]
pub struct SubmissionStore {
    pool: PgPool,
}

impl SubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a fresh `draft` row (§4.5 `create`).
    pub async fn insert_draft(&self, tenant_id: TenantId, account_id: AccountId, payload: &SubmissionPayload, created_by: UserId) -> Result<Submission, EngineError> {
        let id = Uuid::new_v4();
        let payload_json = serde_json::to_value(payload).expect("SubmissionPayload always serializes");
        let row: SubmissionRow = sqlx::query_as(&format!(
            "INSERT INTO submissions (id, tenant_id, account_id, kind, payload, status, created_at, updated_at, created_by, is_correction, retried)
             VALUES ($1, $2, $3, $4, $5, 'draft', now(), now(), $6, false, false)
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(tenant_id.as_uuid())
        .bind(account_id.as_uuid())
        .bind(kind_str(payload.kind()))
        .bind(&payload_json)
        .bind(created_by.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        row.into_submission()
    }

    /// Insert a correction row (§4.5 `correct`): always starts in
    /// `draft`, carries `corrects_id`/`is_correction`, and reuses the
    /// identity fields of the corrected submission's payload.
    pub async fn insert_correction(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        payload: &SubmissionPayload,
        created_by: UserId,
        corrects_id: SubmissionId,
    ) -> Result<Submission, EngineError> {
        let id = Uuid::new_v4();
        let payload_json = serde_json::to_value(payload).expect("SubmissionPayload always serializes");
        let row: SubmissionRow = sqlx::query_as(&format!(
            "INSERT INTO submissions (id, tenant_id, account_id, kind, payload, status, created_at, updated_at, created_by, corrects_id, is_correction, retried)
             VALUES ($1, $2, $3, $4, $5, 'draft', now(), now(), $6, $7, true, false)
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(tenant_id.as_uuid())
        .bind(account_id.as_uuid())
        .bind(kind_str(payload.kind()))
        .bind(&payload_json)
        .bind(created_by.as_uuid())
        .bind(corrects_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        row.into_submission()
    }

    /// Insert a change-submission row (§4.5 `apply-change`), linked to
    /// its baseline via `original_submission_id`.
    pub async fn insert_change(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        payload: &SubmissionPayload,
        created_by: UserId,
        original_submission_id: SubmissionId,
    ) -> Result<Submission, EngineError> {
        let id = Uuid::new_v4();
        let payload_json = serde_json::to_value(payload).expect("SubmissionPayload always serializes");
        let row: SubmissionRow = sqlx::query_as(&format!(
            "INSERT INTO submissions (id, tenant_id, account_id, kind, payload, status, created_at, updated_at, created_by, original_submission_id, is_correction, retried)
             VALUES ($1, $2, $3, $4, $5, 'draft', now(), now(), $6, $7, false, false)
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(tenant_id.as_uuid())
        .bind(account_id.as_uuid())
        .bind(kind_str(payload.kind()))
        .bind(&payload_json)
        .bind(created_by.as_uuid())
        .bind(original_submission_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        row.into_submission()
    }

    pub async fn get(&self, tenant_id: TenantId, id: SubmissionId) -> Result<Submission, EngineError> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM submissions WHERE id = $1 AND tenant_id = $2"))
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(SubmissionRow::into_submission)
            .transpose()?
            .ok_or_else(|| amtskern_core::DomainError::NotFound(id.to_string()).into())
    }

    /// Find the most recent `accepted`/`submitted` baseline for a
    /// subject (§4.5 `detect-change`): "the engine finds the most
    /// recent accepted/submitted baseline for that subject of kind in
    /// {registration, change}". `subject_key` is matched against the
    /// JSON payload's embedded identifier.
    pub async fn find_latest_baseline(&self, tenant_id: TenantId, subject_key: &str) -> Result<Option<Submission>, EngineError> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM submissions
             WHERE tenant_id = $1
               AND kind IN ('registration', 'change')
               AND status IN ('accepted', 'submitted')
               AND payload->'data'->>'sv_number' = $2
             ORDER BY submitted_at DESC NULLS LAST, updated_at DESC
             LIMIT 1"
        ))
        .bind(tenant_id.as_uuid())
        .bind(subject_key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SubmissionRow::into_submission).transpose()
    }

    /// `draft -> validated` (§4.5 `validate`). Warnings from C2 are
    /// not separately columned; the row's own payload already carries
    /// everything the warnings were computed from, so callers recompute
    /// them on read rather than storing a derivative.
    pub async fn mark_validated(&self, tenant_id: TenantId, id: SubmissionId) -> Result<(), EngineError> {
        self.transition(tenant_id, id, "validated", &[("status", "draft")]).await
    }

    /// `rejected -> validated` via `retry` (§4.5), setting `retried`
    /// so a second `retry` is refused by the engine's own check before
    /// this is even called.
    pub async fn mark_retried(&self, tenant_id: TenantId, id: SubmissionId) -> Result<(), EngineError> {
        let affected = sqlx::query("UPDATE submissions SET status = 'validated', retried = true, updated_at = now() WHERE id = $1 AND tenant_id = $2 AND status = 'rejected'")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(amtskern_core::DomainError::IllegalTransition("retry requires status=rejected".into()).into());
        }
        Ok(())
    }

    async fn transition(&self, tenant_id: TenantId, id: SubmissionId, to: &str, from_guard: &[(&str, &str)]) -> Result<(), EngineError> {
        let from = from_guard.iter().find(|(k, _)| *k == "status").map(|(_, v)| *v).unwrap_or("draft");
        let affected = sqlx::query("UPDATE submissions SET status = $1, updated_at = now() WHERE id = $2 AND tenant_id = $3 AND status = $4")
            .bind(to)
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .bind(from)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(amtskern_core::DomainError::IllegalTransition(format!("expected status={from} to transition to {to}")).into());
        }
        Ok(())
    }

    /// Persist the request XML before dispatch (§4.5 step 2: "Persist
    /// the exact request bytes on the row") — a separate write from
    /// the outcome update so the bytes survive even if the wire call
    /// itself then fails catastrophically.
    pub async fn persist_request_xml(&self, tenant_id: TenantId, id: SubmissionId, request_xml: &str) -> Result<(), EngineError> {
        sqlx::query("UPDATE submissions SET request_xml = $1, updated_at = now() WHERE id = $2 AND tenant_id = $3")
            .bind(request_xml)
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Successful acceptance (§4.5 step 3, first bullet): `validated
    /// -> submitted`, protocol number recorded, error fields cleared.
    /// §4.5 step 4's read-modify-write guarantee — the protocol number
    /// must be recorded even if this call itself later fails — is the
    /// caller's responsibility (it retries this exact call; the SQL is
    /// naturally idempotent on the same protocol number).
    pub async fn record_success(&self, tenant_id: TenantId, id: SubmissionId, response_xml: &str, protocol_number: &str) -> Result<(), EngineError> {
        let affected = sqlx::query(
            "UPDATE submissions
             SET status = 'submitted', response_xml = $1, protocol_number = $2, submitted_at = now(),
                 error_code = NULL, updated_at = now()
             WHERE id = $3 AND tenant_id = $4 AND status = 'validated'",
        )
        .bind(response_xml)
        .bind(protocol_number)
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();
        if affected == 0 {
            return Err(amtskern_core::DomainError::IllegalTransition("submit requires status=validated".into()).into());
        }
        Ok(())
    }

    /// Immediate acceptance (§4.5 step 3: "If the remote immediately
    /// reports a processing result the transition continues to
    /// accepted"): `submitted -> accepted` in the same call.
    pub async fn record_immediate_acceptance(&self, tenant_id: TenantId, id: SubmissionId) -> Result<(), EngineError> {
        self.transition(tenant_id, id, "accepted", &[("status", "submitted")]).await
    }

    /// Rejection (§4.5 step 3, second/third bullet): `validated ->
    /// rejected` with the error recorded. `error_message` is never
    /// cleared once set except by a subsequent successful transition
    /// out of `rejected` (§7) — this call only ever sets it, never clears it.
    pub async fn record_rejection(&self, tenant_id: TenantId, id: SubmissionId, error_code: &str, error_message: &str) -> Result<(), EngineError> {
        let affected = sqlx::query(
            "UPDATE submissions SET status = 'rejected', error_code = $1, error_message = $2, updated_at = now()
             WHERE id = $3 AND tenant_id = $4 AND status = 'validated'",
        )
        .bind(error_code)
        .bind(error_message)
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();
        if affected == 0 {
            return Err(amtskern_core::DomainError::IllegalTransition("rejection requires status=validated".into()).into());
        }
        Ok(())
    }

    /// Delete a draft-only row (§4.5 `delete`).
    pub async fn delete_draft(&self, tenant_id: TenantId, id: SubmissionId) -> Result<(), EngineError> {
        let affected = sqlx::query("DELETE FROM submissions WHERE id = $1 AND tenant_id = $2 AND status = 'draft'")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(amtskern_core::DomainError::IllegalTransition("delete requires status=draft".into()).into());
        }
        Ok(())
    }
}

/// One line item of a submission with repeating rows (§3: "monthly
/// contribution reports"), persisted separately with cascading delete
/// on the parent.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineItemRow {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub order_index: i32,
    pub payload: serde_json::Value,
    pub is_valid: bool,
}

impl SubmissionStore {
    /// Replace all line items of a monthly contribution report. Only
    /// legal while the parent is draft-like (§3 invariant: "a line
    /// item's parent submission must be in a draft-like status until
    /// all parent validation passes") — enforced by the engine calling
    /// this only before `validate` succeeds.
    pub async fn replace_line_items(&self, submission_id: SubmissionId, items: &[amtskern_core::ContributionLineItem]) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM submission_line_items WHERE submission_id = $1")
            .bind(submission_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        for item in items {
            let payload = serde_json::to_value(item).expect("ContributionLineItem always serializes");
            sqlx::query("INSERT INTO submission_line_items (id, submission_id, order_index, payload, is_valid) VALUES ($1, $2, $3, $4, true)")
                .bind(Uuid::new_v4())
                .bind(submission_id.as_uuid())
                .bind(item.order_index)
                .bind(&payload)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn line_items(&self, submission_id: SubmissionId) -> Result<Vec<LineItemRow>, EngineError> {
        let rows: Vec<LineItemRow> = sqlx::query_as("SELECT id, submission_id, order_index, payload, is_valid FROM submission_line_items WHERE submission_id = $1 ORDER BY order_index")
            .bind(submission_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
