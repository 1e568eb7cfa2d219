use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sharefeed_conductor::{functions, ConductorTransport, Connection, Connector, RemoteCall};
use sharefeed_types::{ConnectionSettings, RetrievalOptions, ShareRecord};
use sharefeed_wire::{from_wire, to_remote, RemoteShareInfo, WireRecord};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::query::filter_records;
use crate::traits::ShareStore;

/// Shares stored on the remote ledger conductor.
///
/// No session is kept between calls: every operation runs the connection
/// state machine from scratch. Feed scoping is not sent to the conductor;
/// the listing is filtered client-side exactly like the local backend.
///
/// Deletion is not supported. The ledger only appends, so
/// [`delete_share`](ShareStore::delete_share) logs a warning and returns
/// without touching the remote.
#[derive(Clone)]
pub struct RemoteShareStore {
    connector: Connector,
}

impl RemoteShareStore {
    /// Create a remote store that connects with `settings` on each call.
    pub fn new(transport: Arc<dyn ConductorTransport>, settings: ConnectionSettings) -> Self {
        Self {
            connector: Connector::new(transport, settings),
        }
    }

    /// Settings this adapter connects with.
    pub fn settings(&self) -> &ConnectionSettings {
        self.connector.settings()
    }

    /// Run the connection state machine once; `true` if it ended connected.
    pub async fn probe(&self) -> bool {
        self.connector.connect().await.is_connected()
    }

    async fn connect(&self) -> StoreResult<Connection> {
        self.connector
            .connect()
            .await
            .into_connection()
            .map_err(|e| StoreError::NotConnected {
                reason: e.to_string(),
            })
    }

    async fn invoke(&self, function: &str, payload: Value) -> StoreResult<Value> {
        let connection = self.connect().await?;
        debug!(function, path = ?connection.path, "calling remote function");
        connection
            .session
            .call(RemoteCall::new(function, payload))
            .await
            .map_err(|e| StoreError::remote_call(function, e))
    }
}

#[async_trait]
impl ShareStore for RemoteShareStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn save_share(&self, record: ShareRecord) -> StoreResult<ShareRecord> {
        record.validate()?;
        let item = to_remote(&record);
        let response = self
            .invoke(functions::CREATE_SHARE_ITEM, serde_json::to_value(item)?)
            .await?;
        let info: RemoteShareInfo = serde_json::from_value(response)?;
        let saved = from_wire(WireRecord::Remote(info));
        debug!(id = %saved.id, "share committed to conductor");
        Ok(saved)
    }

    async fn get_shares(&self, options: &RetrievalOptions) -> StoreResult<Vec<ShareRecord>> {
        let response = self.invoke(functions::GET_RECENT_SHARES, Value::Null).await?;
        let infos: Vec<RemoteShareInfo> = serde_json::from_value(response)?;
        let records = infos
            .into_iter()
            .map(|info| from_wire(WireRecord::Remote(info)))
            .collect();
        Ok(filter_records(records, options))
    }

    async fn delete_share(&self, id: &str) -> StoreResult<()> {
        warn!(%id, "remote backend cannot delete shares; ignoring");
        Ok(())
    }

    fn supports_delete(&self) -> bool {
        false
    }
}
