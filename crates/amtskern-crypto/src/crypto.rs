//! Argon2id key derivation and AES-256-GCM authenticated encryption for
//! the credential-vault blob format (§4.3):
//!
//! ```text
//! salt(16) || nonce(12) || ciphertext-and-tag
//! ```
//!
//! A fresh random salt and nonce are drawn on every write, so two
//! encryptions of the same plaintext under the same passphrase never
//! produce the same blob. Any failure to decrypt — wrong passphrase,
//! truncated blob, flipped bit — surfaces as the single opaque
//! [`VaultError::Integrity`].

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::VaultError;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Argon2id parameters fixed by §4.3: 1 pass, 64 MiB, 4 lanes, 32-byte
/// output. Not user-configurable — changing these changes the blob
/// format.
fn kdf_params() -> Params {
    Params::new(64 * 1024, 1, 4, Some(32)).expect("static Argon2id parameters are always valid")
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; 32], VaultError> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, kdf_params());
    let mut key = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|_| VaultError::Integrity)?;
    Ok(key)
}

/// Encrypt `plaintext` under `passphrase`, returning a self-contained
/// blob carrying its own salt and nonce.
pub fn seal(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut key_bytes = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    key_bytes.zeroize();

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|_| VaultError::Integrity)?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`seal`]. Any failure — short blob,
/// wrong passphrase, tampered ciphertext — collapses to
/// [`VaultError::Integrity`] so no failure mode leaks which part was
/// wrong (§4.3, §7).
pub fn open(blob: &[u8], passphrase: &str) -> Result<Vec<u8>, VaultError> {
    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(VaultError::Integrity);
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut key_bytes = derive_key(passphrase, salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    key_bytes.zeroize();

    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).map_err(|_| VaultError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_under_correct_passphrase() {
        let blob = seal(b"hello vault", "correct horse").unwrap();
        let plain = open(&blob, "correct horse").unwrap();
        assert_eq!(plain, b"hello vault");
    }

    #[test]
    fn wrong_passphrase_is_opaque_integrity_error() {
        let blob = seal(b"hello vault", "correct horse").unwrap();
        let err = open(&blob, "battery staple").unwrap_err();
        assert!(matches!(err, VaultError::Integrity));
    }

    #[test]
    fn truncated_blob_is_rejected_before_kdf() {
        let err = open(&[1, 2, 3], "anything").unwrap_err();
        assert!(matches!(err, VaultError::Integrity));
    }

    #[test]
    fn two_encryptions_of_same_plaintext_differ() {
        let a = seal(b"same", "pw").unwrap();
        let b = seal(b"same", "pw").unwrap();
        assert_ne!(a, b);
    }
}
