//! Bridges a resolved vault [`Account`] (C3) into a wire-ready
//! [`ProtocolClient`] (C4) for one submit call.
//!
//! Per the design note in §9 ("optional client-certificate... the
//! client owns either zero or one TLS configuration; swapping
//! certificates builds a new client transport, never mutates a live
//! one"), a client is built fresh from whatever credential the vault
//! currently holds rather than cached and mutated — the cost of a new
//! `reqwest::Client` is paid once per submit, not once per process.

use std::time::Duration;

use amtskern_core::AccountKind;
use amtskern_crypto::AccountSecret;
use amtskern_protocol::{CertificateStatus, ClientCertificateSource, ClientIdentity, MaintenanceSchedule, ProtocolClient, ProtocolClientConfig};

use crate::error::EngineError;

/// The three provider endpoints this workspace talks to (§1, §6).
/// Fixed per deployment, not per tenant — only the credentials vary.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub tax_portal_url: String,
    pub social_security_url: String,
    pub registry_url: String,
}

impl EndpointConfig {
    fn url_for(&self, kind: AccountKind) -> &str {
        match kind {
            AccountKind::TaxPortal => &self.tax_portal_url,
            AccountKind::SocialSecurity => &self.social_security_url,
            AccountKind::Registry => &self.registry_url,
        }
    }
}

/// Build a [`ProtocolClient`] for this account kind and secret. Only
/// `SocialSecurity` accounts may carry an optional client certificate
/// (§3); the other two kinds authenticate purely at the SOAP-body
/// level and get a plain HTTPS client.
pub fn client_for(
    kind: AccountKind,
    secret: &AccountSecret,
    endpoints: &EndpointConfig,
    maintenance: MaintenanceSchedule,
    timeout: Option<Duration>,
) -> Result<ProtocolClient, EngineError> {
    let identity = match secret {
        AccountSecret::SocialSecurity(cred) => match &cred.client_certificate {
            Some(cert) => {
                let identity = ClientIdentity::load(ClientCertificateSource::Pem {
                    certificate_pem: cert.certificate_pem.clone(),
                    private_key_pem: cert.private_key_pem.clone(),
                })
                .map_err(|e| amtskern_core::DomainError::Auth(e.to_string()))?;
                if matches!(identity.status(chrono::Utc::now()), CertificateStatus::Expired) {
                    return Err(amtskern_core::DomainError::Auth("client certificate has expired".into()).into());
                }
                Some(identity)
            }
            None => None,
        },
        _ => None,
    };

    let client = ProtocolClient::new(ProtocolClientConfig {
        endpoint: endpoints.url_for(kind).to_string(),
        identity,
        maintenance,
        timeout,
    })
    .map_err(|e| amtskern_core::DomainError::Auth(e.to_string()))?;

    Ok(client)
}
