//! `amtskern vault` — credential store operations (§4.3, §6): the
//! `open`/`save`/`add`/`get`/`remove`/`list` surface the core exposes,
//! wired to a file path and passphrase supplied on the command line.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use amtskern_crypto::{Account, AccountSecret, ClientCertificate, CredentialStore, RegistryCredential, SocialSecurityCredential, TaxPortalCredential};

#[derive(Args, Debug)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub command: VaultCommand,
}

#[derive(Subcommand, Debug)]
pub enum VaultCommand {
    /// Create a brand-new, empty vault file.
    Create {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, env = "AMTSKERN_VAULT_PASSPHRASE")]
        passphrase: String,
    },
    /// Add an account to an existing vault and persist it.
    Add {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, env = "AMTSKERN_VAULT_PASSPHRASE")]
        passphrase: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        kind: CliAccountKind,
        /// FinanzOnline office id, ELDA employer id, or (ignored) for registry.
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        /// PIN (tax-portal), secret (social-security), or api key (registry).
        #[arg(long)]
        secret: String,
        /// Path to a PEM-encoded client certificate, social-security accounts only.
        #[arg(long)]
        certificate_pem: Option<PathBuf>,
        /// Path to the matching PEM-encoded private key.
        #[arg(long)]
        private_key_pem: Option<PathBuf>,
    },
    /// List the account names held in a vault (never their secrets).
    List {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, env = "AMTSKERN_VAULT_PASSPHRASE")]
        passphrase: String,
    },
    /// Remove an account by name and persist the change.
    Remove {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, env = "AMTSKERN_VAULT_PASSPHRASE")]
        passphrase: String,
        #[arg(long)]
        name: String,
    },
    /// Print a single account's non-secret metadata (kind only; never
    /// the decrypted secret fields).
    Show {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, env = "AMTSKERN_VAULT_PASSPHRASE")]
        passphrase: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CliAccountKind {
    TaxPortal,
    SocialSecurity,
    Registry,
}

pub fn run(args: VaultArgs) -> anyhow::Result<()> {
    match args.command {
        VaultCommand::Create { path, passphrase } => {
            CredentialStore::create(&path, passphrase)?;
            tracing::info!(path = %path.display(), "vault created");
        }
        VaultCommand::Add { path, passphrase, name, kind, identifier, user_id, secret, certificate_pem, private_key_pem } => {
            let store = CredentialStore::open(&path, passphrase)?;
            let account_secret = build_secret(kind, identifier, user_id, secret, certificate_pem, private_key_pem)?;
            store.add(Account { name: name.clone(), secret: account_secret })?;
            store.save()?;
            tracing::info!(path = %path.display(), account = %name, "account added");
        }
        VaultCommand::List { path, passphrase } => {
            let store = CredentialStore::open(&path, passphrase)?;
            for name in store.list() {
                println!("{name}");
            }
        }
        VaultCommand::Remove { path, passphrase, name } => {
            let store = CredentialStore::open(&path, passphrase)?;
            store.remove(&name)?;
            store.save()?;
            tracing::info!(path = %path.display(), account = %name, "account removed");
        }
        VaultCommand::Show { path, passphrase, name } => {
            let store = CredentialStore::open(&path, passphrase)?;
            let account = store.get(&name)?;
            let kind = match account.secret {
                AccountSecret::TaxPortal(_) => "tax_portal",
                AccountSecret::SocialSecurity(_) => "social_security",
                AccountSecret::Registry(_) => "registry",
            };
            println!("{name}: {kind}");
        }
    }
    Ok(())
}

fn build_secret(
    kind: CliAccountKind,
    identifier: Option<String>,
    user_id: Option<String>,
    secret: String,
    certificate_pem: Option<PathBuf>,
    private_key_pem: Option<PathBuf>,
) -> anyhow::Result<AccountSecret> {
    Ok(match kind {
        CliAccountKind::TaxPortal => AccountSecret::TaxPortal(TaxPortalCredential {
            office_id: identifier.ok_or_else(|| anyhow::anyhow!("--identifier (office id) is required for tax-portal accounts"))?,
            user_id: user_id.ok_or_else(|| anyhow::anyhow!("--user-id is required for tax-portal accounts"))?,
            pin: secret,
        }),
        CliAccountKind::SocialSecurity => {
            let client_certificate = match (certificate_pem, private_key_pem) {
                (Some(cert_path), Some(key_path)) => Some(ClientCertificate {
                    certificate_pem: std::fs::read_to_string(cert_path)?,
                    private_key_pem: std::fs::read_to_string(key_path)?,
                }),
                (None, None) => None,
                _ => anyhow::bail!("--certificate-pem and --private-key-pem must be given together"),
            };
            AccountSecret::SocialSecurity(SocialSecurityCredential {
                employer_id: identifier.ok_or_else(|| anyhow::anyhow!("--identifier (employer id) is required for social-security accounts"))?,
                user_id: user_id.ok_or_else(|| anyhow::anyhow!("--user-id is required for social-security accounts"))?,
                secret,
                client_certificate,
            })
        }
        CliAccountKind::Registry => AccountSecret::Registry(RegistryCredential { api_key: secret }),
    })
}
