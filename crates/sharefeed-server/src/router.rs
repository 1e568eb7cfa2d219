use axum::routing::{get, post};
use axum::Router;
use sharefeed_service::ShareContext;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router with all ShareFeed endpoints.
pub fn build_router(ctx: ShareContext) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/message", post(handler::message_handler))
        .route("/v1/shares", get(handler::shares_handler))
        .route("/v1/status", get(handler::status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// [`build_router`] with a CORS layer that accepts any origin.
pub fn build_permissive_router(ctx: ShareContext) -> Router {
    build_router(ctx).layer(CorsLayer::permissive())
}
