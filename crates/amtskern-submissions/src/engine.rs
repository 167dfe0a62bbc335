//! The submission engine (C5, §4.5) — "the heart": ties the validator
//! (C2), the envelope/codec + protocol client (C1/C4), the advisory
//! lock, and persistence together into the state machine's operations.

use std::time::Duration;

use amtskern_core::{
    AccountId, AccountKind, AnnualTaxFormPayload, Changeset, DomainError, EmploymentData, FieldFinding,
    Submission, SubmissionId, SubmissionPayload, SubmissionStatus, TenantId, UserId,
};
use amtskern_crypto::AccountSecret;
use amtskern_deadlines::change_detection::detect_change as diff_employment_data;
use amtskern_protocol::{CancellationToken, MaintenanceSchedule, ProtocolError};

use crate::credentials::{client_for, EndpointConfig};
use crate::error::EngineError;
use crate::lock;
use crate::serializers;
use crate::store::SubmissionStore;

/// The fault codes §7 calls out as transient even though they arrive
/// as a well-formed remote rejection rather than a transport failure.
/// Mirrors `amtskern_protocol::error::is_transient_fault_code`, which
/// is private to that crate — the engine needs the same classification
/// to decide whether a rejected row is retry-eligible.
fn is_transient_fault_code(code: &str) -> bool {
    matches!(code, "MAINTENANCE" | "TEMPORARY-UNAVAILABLE" | "SESSION-EXPIRED" | "SERVER-UNAVAILABLE")
}

fn envelope_err(e: amtskern_protocol::EnvelopeError) -> EngineError {
    DomainError::ValidationSchema(e.to_string()).into()
}

/// Immutable engine configuration: where the three providers live, the
/// maintenance windows to observe, and the per-call timeout override.
#[derive(Clone)]
pub struct SubmissionEngine {
    store: SubmissionStore,
    endpoints: EndpointConfig,
    maintenance: MaintenanceSchedule,
    timeout: Option<Duration>,
}

impl SubmissionEngine {
    pub fn new(store: SubmissionStore, endpoints: EndpointConfig, maintenance: MaintenanceSchedule, timeout: Option<Duration>) -> Self {
        Self { store, endpoints, maintenance, timeout }
    }

    pub fn store(&self) -> &SubmissionStore {
        &self.store
    }

    /// `create(draft)` (§4.5): persists a fresh `draft` row. Monthly
    /// contribution reports also get their line items mirrored into
    /// the child table so they can be queried/indexed independent of
    /// the embedded JSON (§3 invariant: parent stays draft-like until
    /// validation passes — this call never leaves draft).
    pub async fn create(&self, tenant_id: TenantId, account_id: AccountId, payload: SubmissionPayload, created_by: UserId) -> Result<Submission, EngineError> {
        let submission = self.store.insert_draft(tenant_id, account_id, &payload, created_by).await?;
        if let SubmissionPayload::MonthlyContributionReport(report) = &payload {
            self.store.replace_line_items(submission.id, &report.line_items).await?;
        }
        Ok(submission)
    }

    /// `validate(id)` (§4.5 step 1, §4.2): re-runs C2 on the stored
    /// payload. On success the row advances to `validated`; findings
    /// (warnings included) are returned to the caller rather than
    /// persisted separately — the payload they were computed from is
    /// already the row's source of truth.
    pub async fn validate(&self, tenant_id: TenantId, id: SubmissionId) -> Result<Vec<FieldFinding>, EngineError> {
        let submission = self.store.get(tenant_id, id).await?;
        if submission.status != SubmissionStatus::Draft {
            return Err(DomainError::IllegalTransition(format!("validate requires status=draft, found {}", submission.status)).into());
        }
        let findings = amtskern_validator::validate_payload(&submission.payload).map_err(DomainError::from)?;
        self.store.mark_validated(tenant_id, id).await?;
        Ok(findings)
    }

    /// `preview(id) -> xml` (§4.5): materializes the request body
    /// without persisting or dispatching it, for operators to inspect
    /// before a real `submit`.
    pub async fn preview(&self, tenant_id: TenantId, id: SubmissionId) -> Result<String, EngineError> {
        let submission = self.store.get(tenant_id, id).await?;
        let bytes = serializers::encode_request(&submission.payload).map_err(envelope_err)?;
        String::from_utf8(bytes).map_err(|e| DomainError::ValidationSchema(e.to_string()).into())
    }

    /// `submit(id)` (§4.5): the full submit protocol, serialized by a
    /// per-submission-id advisory lock held across the wire call
    /// (§4.5 ordering guarantee, §5 locking discipline). A concurrent
    /// caller on the same id observes `Conflict` without a wire call.
    pub async fn submit(
        &self,
        tenant_id: TenantId,
        id: SubmissionId,
        account_kind: AccountKind,
        account_secret: &AccountSecret,
        cancellation: &CancellationToken,
    ) -> Result<Submission, EngineError> {
        let mut tx = self.store.pool().begin().await?;
        if !lock::try_acquire(&mut tx, id).await? {
            tx.rollback().await?;
            return Err(DomainError::Conflict(id.to_string()).into());
        }

        let submission = self.store.get(tenant_id, id).await?;
        let result = if submission.status != SubmissionStatus::Validated {
            Err(DomainError::IllegalTransition(format!("submit requires status=validated, found {}", submission.status)).into())
        } else {
            self.dispatch(tenant_id, id, submission, account_kind, account_secret, cancellation).await
        };

        tx.commit().await?;
        result
    }

    /// `retry(id)` (§4.5, §7): re-enters `validated` from `rejected`
    /// exactly once, then fires the submit protocol again under the
    /// same advisory lock as an ordinary `submit`.
    pub async fn retry(
        &self,
        tenant_id: TenantId,
        id: SubmissionId,
        account_kind: AccountKind,
        account_secret: &AccountSecret,
        cancellation: &CancellationToken,
    ) -> Result<Submission, EngineError> {
        let mut tx = self.store.pool().begin().await?;
        if !lock::try_acquire(&mut tx, id).await? {
            tx.rollback().await?;
            return Err(DomainError::Conflict(id.to_string()).into());
        }

        let submission = self.store.get(tenant_id, id).await?;
        let result = if submission.status != SubmissionStatus::Rejected {
            Err(DomainError::IllegalTransition(format!("retry requires status=rejected, found {}", submission.status)).into())
        } else if submission.retried {
            Err(DomainError::Business("retry has already been used once for this submission".into()).into())
        } else {
            self.store.mark_retried(tenant_id, id).await?;
            let reloaded = self.store.get(tenant_id, id).await?;
            self.dispatch(tenant_id, id, reloaded, account_kind, account_secret, cancellation).await
        };

        tx.commit().await?;
        result
    }

    /// Steps 1–4 of the submit protocol (§4.5), assuming the caller
    /// already holds the advisory lock and the row is `validated`.
    async fn dispatch(
        &self,
        tenant_id: TenantId,
        id: SubmissionId,
        submission: Submission,
        account_kind: AccountKind,
        account_secret: &AccountSecret,
        cancellation: &CancellationToken,
    ) -> Result<Submission, EngineError> {
        amtskern_validator::validate_payload(&submission.payload).map_err(DomainError::from)?;

        let (request_bytes, soap_action) = if submission.is_correction {
            let corrects_id = submission
                .corrects_id
                .ok_or_else(|| DomainError::Business("is_correction set without corrects_id".into()))?;
            let original = self.store.get(tenant_id, corrects_id).await?;
            let original_protocol_number = original
                .protocol_number
                .ok_or_else(|| DomainError::Business("correction target carries no protocol number".into()))?;
            let action = serializers::correction_soap_action(&submission.payload)
                .ok_or_else(|| DomainError::Business(format!("{} submissions have no correction action", submission.payload.kind())))?;
            let bytes = serializers::encode_correction_request(&submission.payload, &original_protocol_number)
                .ok_or_else(|| DomainError::Business(format!("{} submissions have no correction action", submission.payload.kind())))?
                .map_err(envelope_err)?;
            (bytes, action)
        } else {
            let bytes = serializers::encode_request(&submission.payload).map_err(envelope_err)?;
            let action = serializers::soap_action(&submission.payload);
            (bytes, action)
        };
        let request_xml = String::from_utf8_lossy(&request_bytes).into_owned();
        self.store.persist_request_xml(tenant_id, id, &request_xml).await?;

        let client = client_for(account_kind, account_secret, &self.endpoints, self.maintenance.clone(), self.timeout)?;

        match client.send(cancellation, soap_action, request_bytes).await {
            Ok(response_bytes) => {
                let response_xml = String::from_utf8_lossy(&response_bytes).into_owned();
                let outcome = serializers::decode_response(&submission.payload, &response_bytes).map_err(envelope_err)?;

                if outcome.success {
                    let protocol_number = outcome
                        .protocol_number
                        .ok_or_else(|| DomainError::ValidationSchema("remote reported success without a protocol number".into()))?;
                    if let Err(e) = self.store.record_success(tenant_id, id, &response_xml, &protocol_number).await {
                        // §4.5 step 4: the protocol number must survive even if
                        // this write itself fails; retry the same call once more
                        // with whatever the original error was, then propagate it.
                        let _ = self.store.record_success(tenant_id, id, &response_xml, &protocol_number).await;
                        return Err(e);
                    }
                    if outcome.processing_complete {
                        self.store.record_immediate_acceptance(tenant_id, id).await?;
                    }
                } else {
                    let code = outcome.error_code.unwrap_or_else(|| "UNKNOWN".to_string());
                    let message = outcome.error_message.unwrap_or_else(|| "remote rejected the submission".to_string());
                    self.store.record_rejection(tenant_id, id, &code, &message).await?;
                    if !is_transient_fault_code(&code) {
                        return Err(DomainError::Business(message).into());
                    }
                }
            }
            Err(protocol_error) => {
                let (code, message) = transport_error_code(&protocol_error);
                self.store.record_rejection(tenant_id, id, &code, &message).await?;
                return Err(map_protocol_error(protocol_error).into());
            }
        }

        self.store.get(tenant_id, id).await
    }

    /// `detect-change(subject, current-data)` (§4.5): finds the most
    /// recent accepted/submitted baseline for `current.sv_number` and
    /// diffs it against `current`. Fails with `NotFound` if no
    /// baseline exists — "if no baseline exists the call fails with a
    /// distinct error."
    pub async fn detect_change(&self, tenant_id: TenantId, current: &EmploymentData) -> Result<Changeset, EngineError> {
        let baseline = self
            .store
            .find_latest_baseline(tenant_id, &current.sv_number)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no accepted or submitted baseline for {}", current.sv_number)))?;
        let baseline_data = baseline
            .payload
            .employment_data()
            .ok_or_else(|| DomainError::ValidationSchema("baseline submission carries no employment data".into()))?;
        Ok(diff_employment_data(baseline_data, current))
    }

    /// `apply-change(subject, changeset, date) -> new-id` (§4.5): opens
    /// a new `Change` submission in `draft`, linked to the baseline
    /// that `detect_change` diffed against. The changeset itself is not
    /// stored — the new submission's payload already carries every
    /// field; re-running `detect_change` later reproduces the same
    /// diff against the now-superseded baseline.
    pub async fn apply_change(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        original_submission_id: SubmissionId,
        current: EmploymentData,
        created_by: UserId,
    ) -> Result<Submission, EngineError> {
        let payload = SubmissionPayload::Change(current);
        self.store.insert_change(tenant_id, account_id, &payload, created_by, original_submission_id).await
    }

    /// `correct(id, patch) -> new-id` (§4.5 "Correction"): only legal
    /// once the original carries a non-empty protocol number. Never
    /// mutates the source row.
    pub async fn correct(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        corrects_id: SubmissionId,
        patch: SubmissionPayload,
        created_by: UserId,
    ) -> Result<Submission, EngineError> {
        let original = self.store.get(tenant_id, corrects_id).await?;
        if original.protocol_number.as_deref().unwrap_or("").is_empty() {
            return Err(DomainError::Business("correction requires the original submission to carry a protocol number".into()).into());
        }
        self.store.insert_correction(tenant_id, account_id, &patch, created_by, corrects_id).await
    }

    /// `delete(id)` (§4.5): draft-only.
    pub async fn delete(&self, tenant_id: TenantId, id: SubmissionId) -> Result<(), EngineError> {
        self.store.delete_draft(tenant_id, id).await
    }

    /// Batch analogue of `create` for the annual-tax-form kind (§4.5:
    /// "batch analogues for the annual-tax-form kind"). Each payload is
    /// created independently; one failure does not abort the rest.
    pub async fn create_annual_tax_form_batch(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        forms: Vec<AnnualTaxFormPayload>,
        created_by: UserId,
    ) -> Vec<Result<Submission, EngineError>> {
        let mut results = Vec::with_capacity(forms.len());
        for form in forms {
            results.push(self.create(tenant_id, account_id, SubmissionPayload::AnnualTaxForm(form), created_by).await);
        }
        results
    }

    /// Batch analogue of `submit` for the annual-tax-form kind. Each
    /// submission is dispatched independently under its own advisory
    /// lock; one rejection does not block the rest of the batch.
    pub async fn submit_annual_tax_form_batch(
        &self,
        tenant_id: TenantId,
        ids: &[SubmissionId],
        account_kind: AccountKind,
        account_secret: &AccountSecret,
        cancellation: &CancellationToken,
    ) -> Vec<Result<Submission, EngineError>> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            results.push(self.submit(tenant_id, id, account_kind, account_secret, cancellation).await);
        }
        results
    }
}

/// Error code/message recorded on the row for a transport-level
/// failure (§4.5 step 3, third bullet).
fn transport_error_code(e: &ProtocolError) -> (String, String) {
    let code = match e {
        ProtocolError::Timeout => "TIMEOUT",
        ProtocolError::Connection(_) => "CONNECTION-FAILED",
        ProtocolError::ServerError(_) => "SERVER-UNAVAILABLE",
        ProtocolError::Maintenance => "MAINTENANCE",
        ProtocolError::Cancelled => "CANCELLED",
        ProtocolError::Certificate(_) => "CERTIFICATE-ERROR",
        ProtocolError::Rejected { code, .. } => return (code.clone(), e.to_string()),
        ProtocolError::Envelope(_) => "SCHEMA-BIND-FAILED",
    };
    (code.to_string(), e.to_string())
}

fn map_protocol_error(e: ProtocolError) -> DomainError {
    use amtskern_protocol::Retryability;
    match e.retryability() {
        Retryability::Retryable => DomainError::Transient { code: transport_error_code(&e).0, message: e.to_string() },
        Retryability::Terminal => match e {
            ProtocolError::Certificate(msg) => DomainError::Auth(msg),
            ProtocolError::Rejected { message, .. } => DomainError::Business(message),
            other => DomainError::Transient { code: transport_error_code(&other).0, message: other.to_string() },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_fault_codes_match_protocol_classification() {
        assert!(is_transient_fault_code("SERVER-UNAVAILABLE"));
        assert!(is_transient_fault_code("SESSION-EXPIRED"));
        assert!(!is_transient_fault_code("ALREADY-REGISTERED"));
    }
}
