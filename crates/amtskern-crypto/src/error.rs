//! Credential-store error types (§4.3, §7).

use thiserror::Error;

/// Errors from credential-vault operations.
///
/// [`VaultError::Integrity`] is deliberately the single outcome for
/// "wrong passphrase" and "tampered/corrupted blob" — distinguishing
/// them would give an attacker an oracle (§4.3, §7).
#[derive(Error, Debug)]
pub enum VaultError {
    /// Filesystem I/O failure reading or writing the blob.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decryption failed, or the blob was too short to contain a
    /// salt/nonce/tag. Never distinguished from a wrong passphrase.
    #[error("invalid passphrase or corrupted data")]
    Integrity,

    /// The decrypted document's `version` field did not match the one
    /// this crate understands. No silent migration (§4.3).
    #[error("unsupported credential blob version: {0}")]
    VersionMismatch(u32),

    /// `add` was called with a name already present in the vault.
    #[error("account name already in use: {0}")]
    DuplicateName(String),

    /// `get`/`remove` referenced a name not present in the vault.
    #[error("no such account: {0}")]
    NotFound(String),

    /// The decrypted bytes were not valid JSON for the document schema.
    #[error("malformed credential document: {0}")]
    Malformed(String),
}
