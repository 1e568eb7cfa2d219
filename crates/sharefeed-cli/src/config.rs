use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sharefeed_server::ServerConfig;
use sharefeed_types::ConnectionSettings;

/// CLI configuration, read from TOML.
///
/// Every field has a default, so a partial file (or none at all) works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharefeedConfig {
    /// Where the local store file lives.
    pub data_dir: PathBuf,
    /// How long a remote availability result stays fresh.
    pub check_interval_ms: u64,
    /// Upper bound on a status query before it reports unavailable.
    pub status_timeout_ms: u64,
    pub remote: RemoteConfig,
    pub server: ServerConfig,
}

impl Default for SharefeedConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sharefeed"),
            check_interval_ms: 30_000,
            status_timeout_ms: 3_000,
            remote: RemoteConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Conductor defaults, used until settings are stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub admin_port: u16,
    pub app_port: u16,
    pub enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            admin_port: 0,
            app_port: 0,
            enabled: false,
        }
    }
}

impl RemoteConfig {
    /// Default connection settings for the storage manager.
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.admin_port, self.app_port, self.enabled)
    }
}

impl SharefeedConfig {
    /// Read the config at `path`, or the defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
