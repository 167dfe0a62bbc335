//! The secret-bearing half of a government account (§3, §4.3).
//!
//! These types only ever exist decrypted, in memory, for the lifetime
//! of a single protocol call. They are never logged and never
//! `Debug`-derived with their secret fields left bare.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A client certificate and private key, PEM-encoded, for the optional
/// ELDA mTLS path (§4.3, §6).
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ClientCertificate {
    pub certificate_pem: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate").field("certificate_pem", &"<redacted>").field("private_key_pem", &"<redacted>").finish()
    }
}

/// FinanzOnline tax-portal credential: 12-digit office id, user id, PIN.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct TaxPortalCredential {
    pub office_id: String,
    pub user_id: String,
    pub pin: String,
}

impl std::fmt::Debug for TaxPortalCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxPortalCredential")
            .field("office_id", &self.office_id)
            .field("user_id", &self.user_id)
            .field("pin", &"<redacted>")
            .finish()
    }
}

/// ELDA social-security credential: 8-digit employer id, user id,
/// secret, and an optional client certificate for mTLS transport.
#[derive(Clone, Serialize, Deserialize)]
pub struct SocialSecurityCredential {
    pub employer_id: String,
    pub user_id: String,
    pub secret: String,
    pub client_certificate: Option<ClientCertificate>,
}

impl Zeroize for SocialSecurityCredential {
    fn zeroize(&mut self) {
        self.secret.zeroize();
        if let Some(cert) = &mut self.client_certificate {
            cert.zeroize();
        }
    }
}

impl Drop for SocialSecurityCredential {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for SocialSecurityCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialSecurityCredential")
            .field("employer_id", &self.employer_id)
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .field("client_certificate", &self.client_certificate.is_some())
            .finish()
    }
}

/// Firmenbuch registry credential: a single API key.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RegistryCredential {
    pub api_key: String,
}

impl std::fmt::Debug for RegistryCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredential").field("api_key", &"<redacted>").finish()
    }
}

/// The closed set of secret shapes a vault entry can hold, tagged by
/// the account kind it authenticates (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountSecret {
    TaxPortal(TaxPortalCredential),
    SocialSecurity(SocialSecurityCredential),
    Registry(RegistryCredential),
}

/// One named entry in the vault. `name` is the handle
/// `AccountMetadata::vault_name` in `amtskern-core` points at, and is
/// unique within a vault document (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub secret: AccountSecret,
}
