//! # amtskern-crypto
//!
//! The credential store (C3): Argon2id key derivation, AES-256-GCM
//! authenticated encryption, and a tenant-scoped vault of government
//! account secrets (§4.3). Nothing here touches the network; protocol
//! clients in `amtskern-protocol` borrow decrypted secrets from a
//! [`CredentialStore`] for the lifetime of a single call and drop them
//! immediately after.

pub mod crypto;
pub mod error;
pub mod secret;
pub mod store;

pub use error::VaultError;
pub use secret::{Account, AccountSecret, ClientCertificate, RegistryCredential, SocialSecurityCredential, TaxPortalCredential};
pub use store::CredentialStore;
