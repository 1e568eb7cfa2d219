use async_trait::async_trait;
use sharefeed_types::{RetrievalOptions, ShareRecord};

use crate::error::StoreResult;

/// The storage adapter contract shared by every backend.
///
/// Implementations must satisfy these invariants:
/// - Reads return canonical records sorted newest-first by `shared_at`,
///   filtered through [`filter_records`](crate::filter_records).
/// - Reading an empty store is not an error.
/// - Absence is `Ok(None)` from [`get_share`](Self::get_share), never an error.
/// - Deleting an unknown id is a no-op.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Short backend name used in logs and status reports.
    fn name(&self) -> &'static str;

    /// Persist a record and return it as the backend stored it.
    ///
    /// Backends that assign their own identity (the remote ledger) return a
    /// record whose `id`, `shared_at` and `shared_by` differ from the input.
    async fn save_share(&self, record: ShareRecord) -> StoreResult<ShareRecord>;

    /// Read records matching `options`.
    async fn get_shares(&self, options: &RetrievalOptions) -> StoreResult<Vec<ShareRecord>>;

    /// Remove the record with `id`, if present.
    async fn delete_share(&self, id: &str) -> StoreResult<()>;

    /// Look up one record by id.
    ///
    /// Default implementation scans a full read.
    async fn get_share(&self, id: &str) -> StoreResult<Option<ShareRecord>> {
        let all = self.get_shares(&RetrievalOptions::all()).await?;
        Ok(all.into_iter().find(|r| r.id == id))
    }

    /// Whether [`delete_share`](Self::delete_share) actually removes data.
    fn supports_delete(&self) -> bool {
        true
    }
}
