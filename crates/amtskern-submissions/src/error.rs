//! Errors surfaced by the submission engine (C5, §7).
//!
//! [`DomainError`] from `amtskern-core` is the taxonomy the engine
//! classifies every outcome into before returning to its caller; this
//! type adds the two infrastructure failure modes (database, vault)
//! that the spec's taxonomy treats as out-of-band since they are not
//! part of the government-protocol error surface.

use amtskern_core::DomainError;
use amtskern_crypto::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("credential vault error: {0}")]
    Vault(#[from] VaultError),
}

impl EngineError {
    /// Whether the caller should treat this as retryable, mirroring
    /// [`DomainError::is_retryable`] for the cases that originate
    /// there; infrastructure failures (DB, vault) are never
    /// automatically retried by the engine itself (§7).
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Domain(e) if e.is_retryable())
    }
}
