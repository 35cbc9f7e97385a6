//! Module configuration.
//!
//! Loaded from an optional YAML file, then overridden by `GRANT_ACCESS_*`
//! environment variables (`__` separates nested keys). Switching storage
//! from the environment alone takes both `GRANT_ACCESS_STORAGE__KIND=sqlite`
//! and `GRANT_ACCESS_STORAGE__DSN`; the `kind` tag is never implied.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

use crate::domain::service::DEFAULT_SERVICE_ID;
use crate::infra::directory::StaticDirectoryConfig;

pub const ENV_PREFIX: &str = "GRANT_ACCESS_";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrantAccessConfig {
    /// Issuing application id stamped on menu and action grants.
    pub service_id: String,

    pub storage: StorageConfig,

    /// Seed data for the built-in static directory.
    pub directory: StaticDirectoryConfig,
}

impl Default for GrantAccessConfig {
    fn default() -> Self {
        Self {
            service_id: DEFAULT_SERVICE_ID.to_owned(),
            storage: StorageConfig::default(),
            directory: StaticDirectoryConfig::default(),
        }
    }
}

/// Where grants are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum StorageConfig {
    /// Process memory; lost on restart.
    #[default]
    Memory,
    /// `SQLite` through `SeaORM`, e.g. `sqlite://grants.db?mode=rwc`.
    Sqlite { dsn: String },
}

impl GrantAccessConfig {
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let cfg = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(cfg)
    }
}
