use std::sync::Arc;

use serde_json::Value;
use sharefeed_store::kv::{keys, save, KeyValueStore};
use sharefeed_store::StoreResult;
use sharefeed_types::{ConnectionSettings, ConnectionSettingsUpdate, StorageMode};
use tracing::warn;

/// Persisted storage mode and remote connection settings.
#[derive(Clone)]
pub struct SettingsRepository {
    kv: Arc<dyn KeyValueStore>,
    defaults: ConnectionSettings,
}

impl SettingsRepository {
    /// Create a repository with disabled default settings.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_defaults(kv, ConnectionSettings::default())
    }

    /// Use `defaults` for any connection setting never persisted.
    pub fn with_defaults(kv: Arc<dyn KeyValueStore>, defaults: ConnectionSettings) -> Self {
        Self { kv, defaults }
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// The configured mode; `auto` when unset or unrecognized.
    pub async fn mode(&self) -> StoreResult<StorageMode> {
        match self.kv.get(keys::STORAGE_MODE).await? {
            Some(Value::String(raw)) => Ok(raw.parse().unwrap_or_else(|_| {
                warn!(mode = %raw, "unrecognized storage mode; using auto");
                StorageMode::Auto
            })),
            Some(other) => {
                warn!(value = %other, "storage mode is not a string; using auto");
                Ok(StorageMode::Auto)
            }
            None => Ok(StorageMode::Auto),
        }
    }

    /// Persist the storage mode.
    pub async fn set_mode(&self, mode: StorageMode) -> StoreResult<()> {
        save(self.kv.as_ref(), keys::STORAGE_MODE, &mode).await
    }

    /// Stored settings, with missing fields taken from the defaults.
    pub async fn connection_settings(&self) -> StoreResult<ConnectionSettings> {
        let Some(Value::Object(stored)) = self.kv.get(keys::CONDUCTOR_SETTINGS).await? else {
            return Ok(self.defaults);
        };
        let update = ConnectionSettingsUpdate {
            admin_port: stored.get("adminPort").and_then(port),
            app_port: stored.get("appPort").and_then(port),
            enabled: stored.get("enabled").and_then(Value::as_bool),
        };
        Ok(self.defaults.merged(&update))
    }

    /// Merge `update` over the stored settings and persist the result.
    pub async fn update_connection_settings(
        &self,
        update: &ConnectionSettingsUpdate,
    ) -> StoreResult<ConnectionSettings> {
        let merged = self.connection_settings().await?.merged(update);
        save(self.kv.as_ref(), keys::CONDUCTOR_SETTINGS, &merged).await?;
        Ok(merged)
    }
}

fn port(value: &Value) -> Option<u16> {
    value.as_u64().and_then(|p| u16::try_from(p).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sharefeed_store::MemoryKeyValueStore;

    fn repo() -> (Arc<MemoryKeyValueStore>, SettingsRepository) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (kv.clone(), SettingsRepository::new(kv))
    }

    #[tokio::test]
    async fn defaults_when_nothing_persisted() {
        let (_, repo) = repo();
        assert_eq!(repo.mode().await.unwrap(), StorageMode::Auto);
        assert_eq!(
            repo.connection_settings().await.unwrap(),
            ConnectionSettings::new(0, 0, false)
        );
    }

    #[tokio::test]
    async fn legacy_mode_name_reads_as_remote() {
        let (kv, repo) = repo();
        kv.set(keys::STORAGE_MODE, json!("holochain")).await.unwrap();
        assert_eq!(repo.mode().await.unwrap(), StorageMode::Remote);
    }

    #[tokio::test]
    async fn garbage_mode_reads_as_auto() {
        let (kv, repo) = repo();
        kv.set(keys::STORAGE_MODE, json!("sideways")).await.unwrap();
        assert_eq!(repo.mode().await.unwrap(), StorageMode::Auto);
        kv.set(keys::STORAGE_MODE, json!(3)).await.unwrap();
        assert_eq!(repo.mode().await.unwrap(), StorageMode::Auto);
    }

    #[tokio::test]
    async fn mode_roundtrip() {
        let (kv, repo) = repo();
        repo.set_mode(StorageMode::Local).await.unwrap();
        assert_eq!(kv.get(keys::STORAGE_MODE).await.unwrap(), Some(json!("local")));
        assert_eq!(repo.mode().await.unwrap(), StorageMode::Local);
    }

    #[tokio::test]
    async fn partial_update_merges() {
        let (kv, repo) = repo();
        repo.update_connection_settings(&ConnectionSettingsUpdate {
            app_port: Some(8888),
            ..Default::default()
        })
        .await
        .unwrap();
        let merged = repo
            .update_connection_settings(&ConnectionSettingsUpdate {
                enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(merged, ConnectionSettings::new(0, 8888, true));
        assert_eq!(
            kv.get(keys::CONDUCTOR_SETTINGS).await.unwrap(),
            Some(json!({"adminPort": 0, "appPort": 8888, "enabled": true}))
        );
    }

    #[tokio::test]
    async fn partial_stored_object_fills_from_defaults() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(keys::CONDUCTOR_SETTINGS, json!({"enabled": true, "appPort": "bad"}))
            .await
            .unwrap();
        let repo = SettingsRepository::with_defaults(kv, ConnectionSettings::new(4444, 8888, false));
        assert_eq!(
            repo.connection_settings().await.unwrap(),
            ConnectionSettings::new(4444, 8888, true)
        );
    }
}
