//! The credential store (C3): a versioned, encrypted-at-rest JSON
//! document of [`Account`] entries, cached in memory behind a lock
//! while open (§4.3, §5).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::crypto::{open, seal};
use crate::error::VaultError;
use crate::secret::Account;

/// The document schema's current version. A blob decrypting to any
/// other value is a hard error — there is no migration path (§4.3).
const CURRENT_VERSION: u32 = 1;

/// Write `bytes` to `path` with mode 0600 on Unix (§6: "on-disk file
/// mode 0600"), truncating any prior contents. `OpenOptions` sets the
/// mode atomically at creation time rather than via a separate
/// `chmod` after the fact, so the file is never briefly
/// group/world-readable.
#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultDocument {
    version: u32,
    accounts: Vec<Account>,
}

/// An open credential vault backed by a single encrypted file.
///
/// Every mutating call updates the in-memory cache and leaves the
/// on-disk blob untouched until [`CredentialStore::save`] is called
/// explicitly — mirroring how the teacher's local key provider treats
/// its backing file as a write-through cache, not a live mirror.
pub struct CredentialStore {
    path: PathBuf,
    passphrase: String,
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl CredentialStore {
    /// Create a brand-new, empty vault at `path`. Fails if a file is
    /// already there — use [`CredentialStore::open`] for an existing one.
    pub fn create(path: impl AsRef<Path>, passphrase: impl Into<String>) -> Result<Self, VaultError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(VaultError::Malformed(format!("{} already exists", path.display())));
        }
        let store = Self {
            path,
            passphrase: passphrase.into(),
            accounts: Arc::new(RwLock::new(Vec::new())),
        };
        store.save()?;
        Ok(store)
    }

    /// Open an existing vault, decrypting its contents with
    /// `passphrase`. A wrong passphrase and a corrupted file are
    /// indistinguishable to the caller (§4.3, §7).
    pub fn open(path: impl AsRef<Path>, passphrase: impl Into<String>) -> Result<Self, VaultError> {
        let path = path.as_ref().to_path_buf();
        let passphrase = passphrase.into();
        let blob = std::fs::read(&path)?;
        let plaintext = open(&blob, &passphrase)?;
        let document: VaultDocument =
            serde_json::from_slice(&plaintext).map_err(|e| VaultError::Malformed(e.to_string()))?;
        if document.version != CURRENT_VERSION {
            return Err(VaultError::VersionMismatch(document.version));
        }
        Ok(Self {
            path,
            passphrase,
            accounts: Arc::new(RwLock::new(document.accounts)),
        })
    }

    /// Re-encrypt the current in-memory contents under a fresh salt
    /// and nonce and write them to the backing file.
    pub fn save(&self) -> Result<(), VaultError> {
        let document = VaultDocument {
            version: CURRENT_VERSION,
            accounts: self.accounts.read().clone(),
        };
        let plaintext = serde_json::to_vec(&document).map_err(|e| VaultError::Malformed(e.to_string()))?;
        let blob = seal(&plaintext, &self.passphrase)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.path, &blob)?;
        tracing::info!(path = %self.path.display(), accounts = document.accounts.len(), "vault saved");
        Ok(())
    }

    /// Add a new account. Names are unique within a vault (§4.3); this
    /// does not persist the change — call [`CredentialStore::save`].
    pub fn add(&self, account: Account) -> Result<(), VaultError> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| a.name == account.name) {
            return Err(VaultError::DuplicateName(account.name));
        }
        accounts.push(account);
        Ok(())
    }

    /// Look up an account by name.
    pub fn get(&self, name: &str) -> Result<Account, VaultError> {
        self.accounts
            .read()
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(name.to_string()))
    }

    /// Remove an account by name.
    pub fn remove(&self, name: &str) -> Result<(), VaultError> {
        let mut accounts = self.accounts.write();
        let before = accounts.len();
        accounts.retain(|a| a.name != name);
        if accounts.len() == before {
            return Err(VaultError::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// List the names of every account currently held (not their
    /// secrets).
    pub fn list(&self) -> Vec<String> {
        self.accounts.read().iter().map(|a| a.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::{AccountSecret, TaxPortalCredential};
    use tempfile::tempdir;

    fn sample_account(name: &str) -> Account {
        Account {
            name: name.to_string(),
            secret: AccountSecret::TaxPortal(TaxPortalCredential {
                office_id: "123456789012".into(),
                user_id: "U".into(),
                pin: "X".into(),
            }),
        }
    }

    /// Scenario F of §8: encrypt a single-account vault with one
    /// passphrase, decrypt with the same passphrase and get the same
    /// account back; decrypting with a different passphrase fails
    /// with an integrity error.
    #[test]
    fn scenario_f_credential_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");

        let store = CredentialStore::create(&path, "pw").unwrap();
        store.add(sample_account("A")).unwrap();
        store.save().unwrap();

        let reopened = CredentialStore::open(&path, "pw").unwrap();
        let account = reopened.get("A").unwrap();
        match account.secret {
            AccountSecret::TaxPortal(ref cred) => assert_eq!(cred.office_id, "123456789012"),
            _ => panic!("wrong secret variant"),
        }

        let err = CredentialStore::open(&path, "PW").unwrap_err();
        assert!(matches!(err, VaultError::Integrity));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let store = CredentialStore::create(&path, "pw").unwrap();
        store.add(sample_account("A")).unwrap();
        let err = store.add(sample_account("A")).unwrap_err();
        assert!(matches!(err, VaultError::DuplicateName(_)));
    }

    #[test]
    fn remove_then_get_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let store = CredentialStore::create(&path, "pw").unwrap();
        store.add(sample_account("A")).unwrap();
        store.remove("A").unwrap();
        assert!(matches!(store.get("A").unwrap_err(), VaultError::NotFound(_)));
    }

    #[test]
    fn version_mismatch_is_a_hard_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let document = serde_json::json!({ "version": 2, "accounts": [] });
        let blob = seal(&serde_json::to_vec(&document).unwrap(), "pw").unwrap();
        std::fs::write(&path, blob).unwrap();

        let err = CredentialStore::open(&path, "pw").unwrap_err();
        assert!(matches!(err, VaultError::VersionMismatch(2)));
    }

    #[test]
    #[cfg(unix)]
    fn saved_vault_file_has_mode_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let store = CredentialStore::create(&path, "pw").unwrap();
        store.add(sample_account("A")).unwrap();
        store.save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn list_reflects_current_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let store = CredentialStore::create(&path, "pw").unwrap();
        store.add(sample_account("A")).unwrap();
        store.add(sample_account("B")).unwrap();
        let mut names = store.list();
        names.sort();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }
}
