//! Key-value persistence for the local backend.
//!
//! The local backend and the settings repository keep everything under a
//! handful of namespaced keys (see [`keys`]). Values are JSON so that the
//! same layout works for an in-memory map and for a JSON file on disk.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Namespaced keys of the persisted layout.
pub mod keys {
    /// The full ordered share list.
    pub const SHARES: &str = "sharefeed_shares";
    pub const LOCAL_USER_ID: &str = "sharefeed_local_user_id";
    pub const STORAGE_MODE: &str = "sharefeed_storage_mode";
    pub const CONDUCTOR_SETTINGS: &str = "sharefeed_conductor_settings";
}

/// A JSON key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a key. Returns `Ok(None)` if it was never written.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Write a key, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Remove a key. Removing a missing key is a no-op.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Read and decode a typed value.
pub async fn load<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match kv.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encode and write a typed value.
pub async fn save<T: Serialize + Sync>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    kv.set(key, serde_json::to_value(value)?).await
}

/// `HashMap`-backed store for tests and demo runs.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryKeyValueStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().expect("lock poisoned").remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file.
///
/// Writes go to a sibling temp file that is then renamed over the
/// original, so a crash mid-write leaves the previous contents intact.
/// Writers are serialized within the process.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store everything in the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store file `sharefeed.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("sharefeed.json"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Serialization(format!(
                "{} does not hold a JSON object (found {})",
                self.path.display(),
                type_name(&other)
            ))),
        }
    }

    async fn write_all(&self, map: &Map<String, Value>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(map)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = map.len(), "store file written");
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), value);
        self.write_all(&map).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await?;
        if map.remove(key).is_some() {
            self.write_all(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let kv = MemoryKeyValueStore::new();
        assert!(kv.get("k").await.unwrap().is_none());
        kv.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some(json!({"a": 1})));
        kv.remove("k").await.unwrap();
        kv.remove("k").await.unwrap();
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn typed_load_and_save() {
        let kv = MemoryKeyValueStore::new();
        save(&kv, "n", &vec![1u32, 2, 3]).await.unwrap();
        let back: Option<Vec<u32>> = load(&kv, "n").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        let missing: Option<String> = load(&kv, "other").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileStore::in_dir(dir.path());
        kv.set(keys::STORAGE_MODE, json!("local")).await.unwrap();
        kv.set(keys::SHARES, json!([])).await.unwrap();

        let reopened = JsonFileStore::in_dir(dir.path());
        assert_eq!(reopened.get(keys::STORAGE_MODE).await.unwrap(), Some(json!("local")));
        assert_eq!(reopened.get(keys::SHARES).await.unwrap(), Some(json!([])));
    }

    #[tokio::test]
    async fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileStore::new(dir.path().join("nested").join("store.json"));
        assert!(kv.get("anything").await.unwrap().is_none());
        kv.set("k", json!(true)).await.unwrap();
        assert!(kv.path().exists());
    }

    #[tokio::test]
    async fn file_store_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = JsonFileStore::new(&path).get("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn file_store_io_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("store.json");
        std::fs::create_dir(&path).unwrap();
        let err = JsonFileStore::new(&path).get("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
