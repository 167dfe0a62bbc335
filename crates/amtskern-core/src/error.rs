//! Shared error hierarchy (§7).
//!
//! `ValidationError` is produced by `amtskern-validator` (leaf, pure).
//! `DomainError` is the umbrella the submission engine surfaces to its
//! caller; it carries enough structure to map onto the taxonomy in §7
//! (validation-field, validation-schema, auth, business, transient,
//! conflict, integrity) without naming HTTP status codes — that
//! mapping belongs to the router outside this core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a single validation finding (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks the transition to `validated`.
    Error,
    /// Recorded on the row but does not block.
    Warning,
}

/// One field-level validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFinding {
    /// Dotted path to the offending field, e.g. `line_items[1].sv_number`.
    pub field: String,
    /// Machine-readable code, e.g. `"serial-zero"`, `"check-digit-mismatch"`.
    pub code: String,
    /// Locale-appropriate message (English by default; callers localize).
    pub message: String,
    pub severity: Severity,
}

/// Errors raised by the pure domain validator (C2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more field-level findings at `Severity::Error`.
    #[error("{0:?}")]
    Fields(Vec<FieldFinding>),
}

impl ValidationError {
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fields(vec![FieldFinding {
            field: field.into(),
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }])
    }

    /// All findings, regardless of kind.
    pub fn findings(&self) -> &[FieldFinding] {
        match self {
            Self::Fields(v) => v,
        }
    }
}

/// The taxonomy from §7, as a type rather than prose.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Bad identifier / bad amount / missing mandatory field.
    #[error("validation failed: {0}")]
    ValidationField(#[from] ValidationError),

    /// Envelope body failed to bind to the expected response schema.
    #[error("schema binding failed: {0}")]
    ValidationSchema(String),

    /// Credential rejected, certificate expired, no permission.
    #[error("authentication/authorization error: {0}")]
    Auth(String),

    /// Subject already registered, correction not allowed, duplicate, etc.
    #[error("business rule violation: {0}")]
    Business(String),

    /// Connection error, timeout, 5xx, maintenance, session-expired.
    #[error("transient error ({code}): {message}")]
    Transient { code: String, message: String },

    /// Advisory lock denied; submit already in progress.
    #[error("operation already in progress for {0}")]
    Conflict(String),

    /// Credential blob decryption failure — never distinguishes cause.
    #[error("invalid passphrase or corrupted data")]
    Integrity,

    /// Programming error: an out-of-graph state transition was attempted.
    #[error("illegal state transition: {0}")]
    IllegalTransition(String),

    /// Row not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Whether this error class is retryable per §4.4/§7. Used by
    /// callers deciding whether to mark a submission eligible for
    /// `retry` without a fresh validation pass.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable() {
        let e = DomainError::Transient {
            code: "SERVER-UNAVAILABLE".into(),
            message: "503".into(),
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn business_is_not_retryable() {
        let e = DomainError::Business("already registered".into());
        assert!(!e.is_retryable());
    }

    #[test]
    fn integrity_message_is_opaque() {
        let e = DomainError::Integrity;
        assert_eq!(e.to_string(), "invalid passphrase or corrupted data");
    }
}
