use async_trait::async_trait;
use serde_json::Value;

use crate::error::ConductorResult;
use crate::message::{AppAuthToken, CellId, RemoteCall};

/// Opens sessions on a conductor's admin and app interfaces.
#[async_trait]
pub trait ConductorTransport: Send + Sync {
    async fn connect_admin(&self, port: u16) -> ConductorResult<Box<dyn AdminSession>>;

    /// Open the app interface, authenticating with `token` when given.
    async fn connect_app(
        &self,
        port: u16,
        token: Option<AppAuthToken>,
    ) -> ConductorResult<Box<dyn AppSession>>;
}

/// An open admin interface session.
#[async_trait]
pub trait AdminSession: Send + Sync {
    async fn issue_app_token(&self, installed_app_id: &str) -> ConductorResult<AppAuthToken>;
    async fn list_cell_ids(&self) -> ConductorResult<Vec<CellId>>;
    async fn authorize_signing_credentials(&self, cell: &CellId) -> ConductorResult<()>;
}

/// An open app interface session.
#[async_trait]
pub trait AppSession: Send + Sync {
    /// Invoke a remote function and return its decoded JSON result.
    async fn call(&self, call: RemoteCall) -> ConductorResult<Value>;
}
