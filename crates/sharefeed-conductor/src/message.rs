use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Installed app id the admin interface issues tokens for.
pub const APP_ID: &str = "sharefeed";
pub const ROLE_NAME: &str = "sharefeed";
pub const ZOME_NAME: &str = "sharefeed";

/// Upper bound for any single conductor request, connects included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote functions exposed by the sharefeed zome.
pub mod functions {
    pub const CREATE_SHARE_ITEM: &str = "create_share_item";
    pub const GET_RECENT_SHARES: &str = "get_recent_shares";
    pub const DELETE_SHARE_ITEM: &str = "delete_share_item";
}

/// Opaque token issued by the admin interface for one app connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppAuthToken(pub Vec<u8>);

/// A cell (DNA instance + agent) whose signing credentials can be authorized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellId {
    pub dna_hash: Vec<u8>,
    pub agent_key: Vec<u8>,
}

/// A remote function invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    pub role_name: String,
    pub zome_name: String,
    pub fn_name: String,
    pub payload: Value,
}

impl RemoteCall {
    /// Target `fn_name` on the sharefeed role and zome.
    pub fn new(fn_name: impl Into<String>, payload: Value) -> Self {
        Self {
            role_name: ROLE_NAME.into(),
            zome_name: ZOME_NAME.into(),
            fn_name: fn_name.into(),
            payload,
        }
    }
}

/// Requests accepted on the admin interface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AdminRequest {
    IssueAppAuthenticationToken { installed_app_id: String },
    ListCellIds,
    AuthorizeSigningCredentials { cell_id: CellId },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AdminResponse {
    AppAuthenticationTokenIssued { token: AppAuthToken },
    CellIdsListed(Vec<CellId>),
    SigningCredentialsAuthorized,
    Error { message: String },
}

/// Requests accepted on the app interface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AppRequest {
    Authenticate { token: AppAuthToken },
    CallZome(RemoteCall),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AppResponse {
    Authenticated,
    ZomeCalled(Value),
    Error { message: String },
}

/// Request framing: responses echo the request id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: u64,
    pub body: T,
}
