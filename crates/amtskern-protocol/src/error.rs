//! Errors raised inside the codec and transport layers (§4.1, §4.4, §7).

use thiserror::Error;

/// Envelope codec failures (C1). Parsing the outer envelope and binding
/// the inner body to a caller-supplied schema are deliberately distinct
/// (§4.1) — a malformed envelope never looks like a schema mismatch.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("failed to serialize request body: {0}")]
    Encode(#[from] quick_xml::SeError),

    #[error("response was not a well-formed SOAP envelope: {0}")]
    Malformed(String),

    #[error("envelope body did not bind to the expected response schema: {0}")]
    SchemaBind(String),
}

/// Whether an error is eligible for the retry loop in §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryability {
    Retryable,
    Terminal,
}

/// Transport/provider-level failures (C4). Carries its own retry
/// classification so §4.4's retry loop never has to re-derive it from
/// an HTTP status code scattered across call sites.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("server returned HTTP {0}")]
    ServerError(u16),

    #[error("the remote endpoint is inside a scheduled maintenance window")]
    Maintenance,

    #[error("remote rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ProtocolError {
    /// Classification used by the retry loop (§4.4): transport
    /// connection failure, idle/read timeout, HTTP 5xx excluding 501,
    /// and the protocol's own "maintenance"/"temporary" fault codes.
    /// Everything else — including any validation/business rejection
    /// from the remote — short-circuits retry.
    pub fn retryability(&self) -> Retryability {
        match self {
            ProtocolError::Connection(_) | ProtocolError::Timeout => Retryability::Retryable,
            ProtocolError::ServerError(code) if *code != 501 => Retryability::Retryable,
            ProtocolError::Rejected { code, .. } if is_transient_fault_code(code) => Retryability::Retryable,
            _ => Retryability::Terminal,
        }
    }
}

/// The explicit "maintenance" / "temporary" protocol fault codes from
/// §7 that count as transient even though they arrive as a well-formed
/// rejection rather than a transport failure.
fn is_transient_fault_code(code: &str) -> bool {
    matches!(code, "MAINTENANCE" | "TEMPORARY-UNAVAILABLE" | "SESSION-EXPIRED" | "SERVER-UNAVAILABLE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_501_is_not_retryable() {
        assert_eq!(ProtocolError::ServerError(501).retryability(), Retryability::Terminal);
    }

    #[test]
    fn http_503_is_retryable() {
        assert_eq!(ProtocolError::ServerError(503).retryability(), Retryability::Retryable);
    }

    #[test]
    fn business_rejection_is_terminal() {
        let e = ProtocolError::Rejected {
            code: "ALREADY-REGISTERED".into(),
            message: "subject already registered".into(),
        };
        assert_eq!(e.retryability(), Retryability::Terminal);
    }

    #[test]
    fn maintenance_fault_code_is_retryable() {
        let e = ProtocolError::Rejected {
            code: "MAINTENANCE".into(),
            message: "scheduled maintenance".into(),
        };
        assert_eq!(e.retryability(), Retryability::Retryable);
    }
}
