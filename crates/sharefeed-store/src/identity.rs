use sharefeed_types::LocalUserId;
use tracing::info;

use crate::error::StoreResult;
use crate::kv::{keys, load, save, KeyValueStore};

/// The persisted local user id, generated on first use.
pub async fn local_user_id(kv: &dyn KeyValueStore) -> StoreResult<LocalUserId> {
    if let Some(raw) = load::<String>(kv, keys::LOCAL_USER_ID).await? {
        if !raw.trim().is_empty() {
            return Ok(LocalUserId::from_persisted(raw));
        }
    }
    let id = LocalUserId::generate();
    save(kv, keys::LOCAL_USER_ID, &id.as_str()).await?;
    info!(user = %id, "generated local user id");
    Ok(id)
}
