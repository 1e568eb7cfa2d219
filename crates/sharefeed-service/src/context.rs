use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sharefeed_manager::{ConnectionStatus, StorageManager};
use sharefeed_types::{ShareRecord, StorageMode};
use sharefeed_wire::BackendKind;
use tracing::{debug, error, info, warn};

use crate::capture::{draft_for, share_notification, CaptureContext, PageMetadata};
use crate::error::ServiceResult;
use crate::message::{types, Message, Response};

/// How long a status query waits for the remote probe.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// What the user sees when a share could not be saved.
pub const SHARE_FAILED: &str = "Could not save the share. Please try again.";

/// Process-wide handle to storage, created once at startup and passed to
/// every surface that needs it.
#[derive(Clone)]
pub struct ShareContext {
    manager: Arc<StorageManager>,
    status_timeout: Duration,
}

impl ShareContext {
    /// Create a context with the default status timeout.
    pub fn new(manager: Arc<StorageManager>) -> Self {
        Self {
            manager,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// How long a status query waits for the probe.
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    /// The storage manager behind this context.
    pub fn manager(&self) -> &Arc<StorageManager> {
        &self.manager
    }

    /// Handle a raw JSON message. Never fails: errors become `SHARE_ERROR`.
    pub async fn handle_value(&self, value: Value) -> Response {
        match Message::from_value(value) {
            Ok(message) => self.respond(message).await,
            Err(e) => {
                warn!(error = %e, "rejected message");
                Response::ShareError(e.to_string())
            }
        }
    }

    /// Handle a parsed message, mapping failures to `SHARE_ERROR`.
    ///
    /// A failed `SHARE_ITEM` answers with [`SHARE_FAILED`]; the real cause
    /// only goes to the log.
    pub async fn respond(&self, message: Message) -> Response {
        let kind = message.type_name();
        match self.handle(message).await {
            Ok(response) => response,
            Err(e) if kind == types::SHARE_ITEM => {
                error!(error = %e, "share failed");
                Response::ShareError(SHARE_FAILED.to_string())
            }
            Err(e) => {
                warn!(message = kind, error = %e, "message failed");
                Response::ShareError(e.to_string())
            }
        }
    }

    /// Handle one message, surfacing the underlying error.
    pub async fn handle(&self, message: Message) -> ServiceResult<Response> {
        debug!(message = message.type_name(), "handling message");
        match message {
            Message::GetShares(options) => Ok(Response::SharesResponse(
                self.manager.get_shares(&options).await?,
            )),
            Message::ShareItem(draft) => {
                Ok(Response::ShareSuccess(self.manager.share(draft).await?))
            }
            Message::GetConnectionStatus => {
                Ok(Response::ConnectionStatus(self.connection_status().await?))
            }
            Message::SetStorageMode(mode) => {
                self.manager.set_mode(mode).await?;
                Ok(Response::Ack)
            }
            Message::ResetConnection => {
                self.manager.reset_connection();
                Ok(Response::Ack)
            }
            Message::GetShare { id } => {
                Ok(Response::ShareResponse(self.manager.get_share(&id).await?))
            }
            Message::DeleteShare { id } => {
                self.manager.delete_share(&id).await?;
                Ok(Response::Ack)
            }
            Message::UpdateConnectionSettings(update) => Ok(Response::ConnectionSettings(
                self.manager.update_connection_settings(&update).await?,
            )),
        }
    }

    /// Live connection status, bounded by the status timeout.
    ///
    /// A probe that does not finish in time reports the remote as
    /// unavailable.
    pub async fn connection_status(&self) -> ServiceResult<ConnectionStatus> {
        match tokio::time::timeout(self.status_timeout, self.manager.check_connection()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(timeout = ?self.status_timeout, "connection check timed out");
                let mode = self.manager.settings().mode().await?;
                Ok(ConnectionStatus {
                    mode,
                    remote_available: false,
                    active_backend: match mode {
                        StorageMode::Remote => None,
                        StorageMode::Local | StorageMode::Auto => Some(BackendKind::Local),
                    },
                })
            }
        }
    }

    /// Share what the user clicked on and return the saved record.
    pub async fn capture(
        &self,
        context: &CaptureContext,
        page: &PageMetadata,
    ) -> ServiceResult<ShareRecord> {
        let draft = draft_for(context, page)?;
        let record = self.manager.share(draft).await?;
        let (title, body) = share_notification(&record);
        info!(%title, %body, "share captured");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sharefeed_conductor::{
        AdminSession, AppAuthToken, AppSession, ConductorResult, ConductorTransport, InMemoryConductor,
    };
    use sharefeed_store::MemoryKeyValueStore;
    use sharefeed_types::ConnectionSettingsUpdate;

    fn context(conductor: &InMemoryConductor) -> ShareContext {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let manager = StorageManager::new(kv, Arc::new(conductor.clone()));
        ShareContext::new(Arc::new(manager))
    }

    async fn enable_remote(ctx: &ShareContext) {
        ctx.handle(Message::UpdateConnectionSettings(ConnectionSettingsUpdate {
            admin_port: Some(0),
            app_port: Some(8888),
            enabled: Some(true),
        }))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn share_then_list() {
        let ctx = context(&InMemoryConductor::new());
        let shared = ctx
            .handle_value(json!({"type": "SHARE_ITEM", "payload": {"url": "https://a.com", "title": "A"}}))
            .await;
        let Response::ShareSuccess(record) = shared else {
            panic!("expected success, got {shared:?}");
        };

        let listed = ctx.handle_value(json!({"type": "GET_SHARES"})).await;
        assert_eq!(listed, Response::SharesResponse(vec![record.clone()]));

        let one = ctx
            .handle_value(json!({"type": "GET_SHARE", "payload": record.id.clone()}))
            .await;
        assert_eq!(one, Response::ShareResponse(Some(record)));
    }

    #[tokio::test]
    async fn failed_share_is_generic() {
        let ctx = context(&InMemoryConductor::new());
        let response = ctx
            .handle_value(json!({"type": "SHARE_ITEM", "payload": {"url": "", "title": "A"}}))
            .await;
        assert_eq!(response, Response::ShareError(SHARE_FAILED.to_string()));
    }

    #[tokio::test]
    async fn unknown_verb_is_rejected() {
        let ctx = context(&InMemoryConductor::new());
        let response = ctx.handle_value(json!({"type": "NOPE"})).await;
        assert_eq!(response, Response::ShareError("unknown message type: NOPE".into()));
    }

    #[tokio::test]
    async fn local_mode_status_never_probes() {
        let conductor = InMemoryConductor::new();
        let ctx = context(&conductor);
        enable_remote(&ctx).await;
        ctx.handle(Message::SetStorageMode(StorageMode::Local)).await.unwrap();

        ctx.handle_value(json!({"type": "GET_SHARES"})).await;
        assert_eq!(conductor.app_connects(), 0);
    }

    #[tokio::test]
    async fn status_reports_remote_when_reachable() {
        let conductor = InMemoryConductor::new();
        let ctx = context(&conductor);
        enable_remote(&ctx).await;

        let status = ctx.connection_status().await.unwrap();
        assert_eq!(
            status,
            ConnectionStatus {
                mode: StorageMode::Auto,
                remote_available: true,
                active_backend: Some(BackendKind::Remote),
            }
        );
    }

    /// Answers like `InMemoryConductor`, but only after `delay`.
    struct SlowConductor {
        inner: InMemoryConductor,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl ConductorTransport for SlowConductor {
        async fn connect_admin(&self, port: u16) -> ConductorResult<Box<dyn AdminSession>> {
            self.inner.connect_admin(port).await
        }

        async fn connect_app(
            &self,
            port: u16,
            token: Option<AppAuthToken>,
        ) -> ConductorResult<Box<dyn AppSession>> {
            tokio::time::sleep(self.delay).await;
            self.inner.connect_app(port, token).await
        }
    }

    fn slow_context(delay: Duration, status_timeout: Duration) -> ShareContext {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let transport = SlowConductor {
            inner: InMemoryConductor::new(),
            delay,
        };
        let manager = StorageManager::new(kv, Arc::new(transport));
        ShareContext::new(Arc::new(manager)).with_status_timeout(status_timeout)
    }

    #[tokio::test]
    async fn status_times_out_as_unavailable() {
        let ctx = slow_context(Duration::from_millis(400), Duration::from_millis(50));
        enable_remote(&ctx).await;

        let status = ctx.connection_status().await.unwrap();
        assert_eq!(
            status,
            ConnectionStatus {
                mode: StorageMode::Auto,
                remote_available: false,
                active_backend: Some(BackendKind::Local),
            }
        );
        assert_eq!(ctx.manager().cache().last_checked_at, None);

        let response = ctx
            .handle_value(json!({"type": "SHARE_ITEM", "payload": {"url": "https://a.com", "title": "A"}}))
            .await;
        assert!(matches!(response, Response::ShareSuccess(_)));
    }

    #[tokio::test]
    async fn status_timeout_in_remote_mode_has_no_backend() {
        let ctx = slow_context(Duration::from_millis(400), Duration::from_millis(50));
        enable_remote(&ctx).await;
        ctx.handle(Message::SetStorageMode(StorageMode::Remote)).await.unwrap();

        let status = ctx.connection_status().await.unwrap();
        assert_eq!(
            status,
            ConnectionStatus {
                mode: StorageMode::Remote,
                remote_available: false,
                active_backend: None,
            }
        );
    }

    #[tokio::test]
    async fn delete_on_remote_is_unsupported() {
        let conductor = InMemoryConductor::new();
        let ctx = context(&conductor);
        enable_remote(&ctx).await;
        let response = ctx
            .handle_value(json!({"type": "DELETE_SHARE", "payload": {"id": "x"}}))
            .await;
        assert!(matches!(response, Response::ShareError(ref msg) if msg.contains("not supported")));
    }

    #[tokio::test]
    async fn reset_and_mode_acknowledge() {
        let ctx = context(&InMemoryConductor::new());
        assert_eq!(ctx.handle_value(json!({"type": "RESET_CONNECTION"})).await, Response::Ack);
        assert_eq!(
            ctx.handle_value(json!({"type": "SET_STORAGE_MODE", "payload": "remote"})).await,
            Response::Ack
        );
        assert_eq!(ctx.manager().settings().mode().await.unwrap(), StorageMode::Remote);
    }

    #[tokio::test]
    async fn capture_builds_and_saves() {
        let ctx = context(&InMemoryConductor::new());
        let page = PageMetadata {
            url: "https://example.com".into(),
            title: "Example".into(),
            ..Default::default()
        };
        let record = ctx
            .capture(
                &CaptureContext::Image {
                    src_url: Some("https://example.com/cat.png".into()),
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(record.title, "Image from Example");
        assert_eq!(
            ctx.manager().get_share(&record.id).await.unwrap(),
            Some(record)
        );
    }
}
