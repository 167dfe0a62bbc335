//! Operator configuration (SPEC_FULL.md ambient "Configuration"
//! section): a small TOML file plus environment overrides, in the
//! style of the teacher pack's env-driven key providers — this binary
//! is the only crate in the workspace allowed to read the environment
//! directly.

use std::path::Path;

use serde::Deserialize;

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_lease_duration_secs() -> i64 {
    300
}

fn default_heartbeat_interval_secs() -> u64 {
    60
}

fn default_claim_batch_size() -> i64 {
    10
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_scheduler_tick_interval_secs() -> u64 {
    60
}

fn default_max_db_connections() -> u32 {
    25
}

fn default_min_db_connections() -> u32 {
    5
}

/// Worker/scheduler bootstrap configuration. Field defaults mirror the
/// spec's stated defaults (§4.4, §4.6, §5: 25/5 pool bounds, lease
/// duration, poll interval).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    /// Tenant the scheduler's session-cleanup tick runs against. A real
    /// deployment ticks once per tenant; this CLI runs a single tenant
    /// per process, matching the "small operator CLI" scope.
    pub tenant_id: String,

    #[serde(default = "default_poll_interval_secs")]
    pub worker_poll_interval_secs: u64,
    #[serde(default = "default_lease_duration_secs")]
    pub lease_duration_secs: i64,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    #[serde(default = "default_claim_batch_size")]
    pub claim_batch_size: i64,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default = "default_scheduler_tick_interval_secs")]
    pub scheduler_tick_interval_secs: u64,
    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,
    #[serde(default = "default_min_db_connections")]
    pub min_db_connections: u32,
}

impl Config {
    /// Load from a TOML file, then let a handful of environment
    /// variables override the values that operators most commonly need
    /// to swap per-deployment without editing the file in place.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        let mut config: Config = toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;

        if let Ok(database_url) = std::env::var("AMTSKERN_DATABASE_URL") {
            config.database_url = database_url;
        }
        if let Ok(tenant_id) = std::env::var("AMTSKERN_TENANT_ID") {
            config.tenant_id = tenant_id;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_only_required_fields_are_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_url = \"postgres://localhost/amtskern\"\ntenant_id = \"00000000-0000-0000-0000-000000000001\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.worker_poll_interval_secs, 5);
        assert_eq!(config.lease_duration_secs, 300);
        assert_eq!(config.max_db_connections, 25);
        assert_eq!(config.min_db_connections, 5);
    }

    #[test]
    fn env_override_takes_precedence_over_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_url = \"postgres://localhost/amtskern\"\ntenant_id = \"00000000-0000-0000-0000-000000000001\"\n").unwrap();

        std::env::set_var("AMTSKERN_DATABASE_URL", "postgres://override/amtskern");
        let config = Config::load(&path).unwrap();
        std::env::remove_var("AMTSKERN_DATABASE_URL");

        assert_eq!(config.database_url, "postgres://override/amtskern");
    }
}
