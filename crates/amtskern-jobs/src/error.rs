//! Job-engine errors (§4.6, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Enqueued under a `JobKind` with no registered handler (§4.6).
    #[error("no handler registered for job kind {0}")]
    UnknownKind(String),

    /// The job row was claimed or completed by a different worker than
    /// the caller — a stale lease, not a bug.
    #[error("job {0} is not leased by this worker")]
    NotLeased(String),

    /// The job was cancelled out from under the worker currently
    /// running it (§4.6: "a running worker observes cancellation via
    /// its context and abandons the attempt").
    #[error("job {0} was cancelled")]
    Cancelled(String),

    #[error("job {0} not found")]
    NotFound(String),
}
