use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Which backend the storage manager routes operations to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Always the local backend.
    Local,
    /// Always the remote conductor; fails when it is unreachable.
    #[serde(alias = "holochain")]
    Remote,
    /// Remote when enabled and reachable, otherwise local.
    #[default]
    Auto,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "holochain" => Ok(Self::Remote),
            "auto" => Ok(Self::Auto),
            other => Err(TypeError::InvalidMode(other.to_string())),
        }
    }
}

/// Connection settings for the remote conductor.
///
/// Disabled by default: the user has to configure ports first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Admin interface port; `0` means not configured.
    pub admin_port: u16,
    /// App interface port.
    pub app_port: u16,
    pub enabled: bool,
}

impl ConnectionSettings {
    /// Create settings from ports and the enable flag.
    pub fn new(admin_port: u16, app_port: u16, enabled: bool) -> Self {
        Self {
            admin_port,
            app_port,
            enabled,
        }
    }

    /// Whether the authenticated admin path should be attempted.
    pub fn has_admin_port(&self) -> bool {
        self.admin_port > 0
    }

    /// Apply a partial update on top of these settings.
    pub fn merged(mut self, update: &ConnectionSettingsUpdate) -> Self {
        if let Some(port) = update.admin_port {
            self.admin_port = port;
        }
        if let Some(port) = update.app_port {
            self.app_port = port;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        self
    }
}

/// A partial settings change; unset fields keep their stored value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ConnectionSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.admin_port.is_none() && self.app_port.is_none() && self.enabled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_default_is_auto() {
        assert_eq!(StorageMode::default(), StorageMode::Auto);
    }

    #[test]
    fn mode_parses_legacy_name() {
        let mode: StorageMode = serde_json::from_str("\"holochain\"").unwrap();
        assert_eq!(mode, StorageMode::Remote);
        assert_eq!("HOLOCHAIN".parse::<StorageMode>().unwrap(), StorageMode::Remote);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StorageMode::Local).unwrap(), "\"local\"");
        assert_eq!(StorageMode::Auto.to_string(), "auto");
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = "cloud".parse::<StorageMode>().unwrap_err();
        assert_eq!(err, TypeError::InvalidMode("cloud".into()));
    }

    #[test]
    fn settings_default_disabled() {
        let s = ConnectionSettings::default();
        assert!(!s.enabled);
        assert!(!s.has_admin_port());
    }

    #[test]
    fn settings_fill_missing_fields_from_default() {
        let s: ConnectionSettings = serde_json::from_str(r#"{"appPort":8888}"#).unwrap();
        assert_eq!(s, ConnectionSettings::new(0, 8888, false));
    }

    #[test]
    fn partial_update_merges() {
        let base = ConnectionSettings::new(4444, 8888, false);
        let update = ConnectionSettingsUpdate {
            enabled: Some(true),
            ..Default::default()
        };
        assert_eq!(base.merged(&update), ConnectionSettings::new(4444, 8888, true));
        assert!(ConnectionSettingsUpdate::default().is_empty());
    }
}
