//! # amtskern-protocol
//!
//! The wire layer: the SOAP envelope codec (C1, §4.1) and the
//! HTTPS/mTLS protocol client (C4, §4.4) that the submission engine
//! calls to actually talk to ELDA, FinanzOnline, and Firmenbuch.
//! Deliberately split in two: the codec is pure and has no notion of
//! retry or transport; the client owns TLS, timeouts, maintenance
//! awareness, and the bounded retry loop, and treats envelope bytes as
//! opaque payloads it ships and receives.

pub mod cancellation;
pub mod client;
pub mod envelope;
pub mod error;
pub mod maintenance;
pub mod retry;
pub mod tls;

pub use cancellation::CancellationToken;
pub use client::{ProtocolClient, ProtocolClientConfig};
pub use envelope::{decode_envelope, encode_envelope};
pub use error::{EnvelopeError, ProtocolError, Retryability};
pub use maintenance::{MaintenanceSchedule, MaintenanceWindow};
pub use tls::{CertificateStatus, ClientCertificateSource, ClientIdentity};
