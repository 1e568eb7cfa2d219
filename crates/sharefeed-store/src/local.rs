use std::sync::Arc;

use async_trait::async_trait;
use sharefeed_types::{RetrievalOptions, ShareRecord};
use sharefeed_wire::{from_wire, to_local, LocalShareRecord, WireRecord};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreResult;
use crate::kv::{keys, load, save, KeyValueStore};
use crate::query::filter_records;
use crate::traits::ShareStore;

/// Shares kept as one ordered list under [`keys::SHARES`].
///
/// New records are prepended, so storage order is call order, not
/// `shared_at` order. Reads re-sort through [`filter_records`].
/// Read-modify-write cycles are serialized so concurrent saves in this
/// process cannot drop each other's records.
pub struct LocalShareStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl LocalShareStore {
    /// Create a local store over `kv`.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// Records in storage order.
    async fn load_all(&self) -> StoreResult<Vec<ShareRecord>> {
        let stored: Vec<LocalShareRecord> =
            load(self.kv.as_ref(), keys::SHARES).await?.unwrap_or_default();
        Ok(stored.into_iter().map(|r| from_wire(WireRecord::Local(r))).collect())
    }

    async fn store_all(&self, records: &[ShareRecord]) -> StoreResult<()> {
        let wire: Vec<LocalShareRecord> = records.iter().map(to_local).collect();
        save(self.kv.as_ref(), keys::SHARES, &wire).await
    }
}

#[async_trait]
impl ShareStore for LocalShareStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn save_share(&self, record: ShareRecord) -> StoreResult<ShareRecord> {
        record.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut all = self.load_all().await?;
        all.insert(0, record.clone());
        self.store_all(&all).await?;
        debug!(id = %record.id, total = all.len(), "share saved locally");
        Ok(record)
    }

    async fn get_shares(&self, options: &RetrievalOptions) -> StoreResult<Vec<ShareRecord>> {
        Ok(filter_records(self.load_all().await?, options))
    }

    async fn delete_share(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.load_all().await?;
        if let Some(pos) = all.iter().position(|r| r.id == id) {
            all.remove(pos);
            self.store_all(&all).await?;
            debug!(%id, "share deleted locally");
        }
        Ok(())
    }

    async fn get_share(&self, id: &str) -> StoreResult<Option<ShareRecord>> {
        Ok(self.load_all().await?.into_iter().find(|r| r.id == id))
    }
}
