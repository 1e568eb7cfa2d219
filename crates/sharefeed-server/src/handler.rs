use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sharefeed_service::{types, Message, Response, ShareContext};
use sharefeed_types::RetrievalOptions;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "sharefeed-server",
        "version": env!("CARGO_PKG_VERSION"),
        "verbs": [
            types::GET_SHARES,
            types::SHARE_ITEM,
            types::GET_CONNECTION_STATUS,
            types::SET_STORAGE_MODE,
            types::RESET_CONNECTION,
            types::GET_SHARE,
            types::DELETE_SHARE,
            types::UPDATE_CONNECTION_SETTINGS,
        ],
    }))
}

/// Dispatch one `{type, payload}` message.
///
/// A message that cannot be parsed is a `400`. Everything else is a `200`
/// whose body says whether the operation succeeded.
pub async fn message_handler(
    State(ctx): State<ShareContext>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Response>) {
    match Message::from_value(body) {
        Ok(message) => (StatusCode::OK, Json(ctx.respond(message).await)),
        Err(e) => {
            warn!(error = %e, "rejected message");
            (StatusCode::BAD_REQUEST, Json(Response::ShareError(e.to_string())))
        }
    }
}

/// Feed read with retrieval options as query parameters.
pub async fn shares_handler(
    State(ctx): State<ShareContext>,
    Query(options): Query<RetrievalOptions>,
) -> axum::response::Response {
    match ctx.manager().get_shares(&options).await {
        Ok(shares) => Json(shares).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Response::ShareError(e.to_string())),
        )
            .into_response(),
    }
}

/// Connection status, bounded by the context's status timeout.
pub async fn status_handler(State(ctx): State<ShareContext>) -> axum::response::Response {
    match ctx.connection_status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Response::ShareError(e.to_string())),
        )
            .into_response(),
    }
}
