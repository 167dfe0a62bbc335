//! Government-account metadata (§3).
//!
//! This is the *non-secret* half of an account: the discriminator and
//! the identifiers needed to route a submission. The secret-bearing
//! half (user ids, PINs, certificates) lives only inside the encrypted
//! vault in `amtskern-crypto` — never in a plain domain struct that
//! could end up in a log line or a debug derive on a DB row.

use crate::ids::{AccountId, TenantId};
use serde::{Deserialize, Serialize};

/// Which of the three government systems this account authenticates
/// against. Exactly one kind per account (§3); the discriminator
/// selects which secret fields are populated in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// FinanzOnline tax-portal access (12-digit office id + user id + secret).
    TaxPortal,
    /// ELDA social-security-reporting access (8-digit employer id + user id
    /// + secret, optionally a client certificate/key pair).
    SocialSecurity,
    /// Firmenbuch registry-API access (api key).
    Registry,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TaxPortal => "tax_portal",
            Self::SocialSecurity => "social_security",
            Self::Registry => "registry",
        };
        write!(f, "{s}")
    }
}

/// The non-secret account row. Deleting a tenant deletes its accounts
/// (cascading delete, enforced at the storage layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub kind: AccountKind,
    /// The name this account is registered under in the credential
    /// vault (`amtskern-crypto::Account::name`); used to look the
    /// secret half up at submit time.
    pub vault_name: String,
}
