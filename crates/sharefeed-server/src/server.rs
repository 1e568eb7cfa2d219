use sharefeed_service::ShareContext;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_permissive_router, build_router};

/// Local ShareFeed HTTP server.
pub struct SharefeedServer {
    config: ServerConfig,
    context: ShareContext,
}

impl SharefeedServer {
    /// Create a server for `context`.
    pub fn new(config: ServerConfig, context: ShareContext) -> Self {
        Self { config, context }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        if self.config.permissive_cors {
            build_permissive_router(self.context.clone())
        } else {
            build_router(self.context.clone())
        }
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("ShareFeed server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
