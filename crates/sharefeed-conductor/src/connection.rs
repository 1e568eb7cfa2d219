use std::fmt;
use std::sync::Arc;

use sharefeed_types::ConnectionSettings;
use tracing::{debug, info, warn};

use crate::error::{ConductorError, ConductorResult};
use crate::message::APP_ID;
use crate::transport::{AppSession, ConductorTransport};

/// States of a single connection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    AdminHandshaking,
    TokenIssued,
    CredentialsAuthorized,
    DataChannelConnecting,
    Connected,
}

/// Which edge of the state machine produced the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectPath {
    /// Admin handshake, token, and authorized credentials.
    Authenticated,
    /// Straight to the app interface without a token.
    Direct,
}

/// A live app session.
pub struct Connection {
    pub session: Box<dyn AppSession>,
    pub path: ConnectPath,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("path", &self.path).finish()
    }
}

/// The record of one pass through the state machine.
#[derive(Debug)]
pub struct ConnectAttempt {
    /// Every state entered, in order, starting at `Disconnected`.
    pub trail: Vec<ConnectionState>,
    /// The connection, or the error that ended the direct path.
    pub result: ConductorResult<Connection>,
}

impl ConnectAttempt {
    /// Whether the attempt ended connected.
    pub fn is_connected(&self) -> bool {
        self.result.is_ok()
    }

    /// The last state reached.
    pub fn final_state(&self) -> ConnectionState {
        self.trail
            .last()
            .copied()
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Take the connection, or the error that ended the attempt.
    pub fn into_connection(self) -> ConductorResult<Connection> {
        self.result
    }
}

/// Drives the connection state machine against a transport.
///
/// Stateless between calls: every [`Connector::connect`] starts from
/// `Disconnected`.
#[derive(Clone)]
pub struct Connector {
    transport: Arc<dyn ConductorTransport>,
    settings: ConnectionSettings,
}

impl Connector {
    /// Create a connector for the given transport and settings.
    pub fn new(transport: Arc<dyn ConductorTransport>, settings: ConnectionSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Settings this connector was built with.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Run one connection attempt to completion or failure.
    pub async fn connect(&self) -> ConnectAttempt {
        let mut trail = vec![ConnectionState::Disconnected];

        if self.settings.has_admin_port() {
            match self.authenticated(&mut trail).await {
                Ok(session) => {
                    trail.push(ConnectionState::Connected);
                    info!(app_port = self.settings.app_port, "conductor connected (authenticated)");
                    return ConnectAttempt {
                        trail,
                        result: Ok(Connection {
                            session,
                            path: ConnectPath::Authenticated,
                        }),
                    };
                }
                Err(e) => {
                    warn!(
                        admin_port = self.settings.admin_port,
                        error = %e,
                        "admin handshake failed; trying app port directly"
                    );
                }
            }
        }

        trail.push(ConnectionState::DataChannelConnecting);
        debug!(app_port = self.settings.app_port, "connecting to app interface without token");
        let result = match self.transport.connect_app(self.settings.app_port, None).await {
            Ok(session) => {
                trail.push(ConnectionState::Connected);
                info!(app_port = self.settings.app_port, "conductor connected (direct)");
                Ok(Connection {
                    session,
                    path: ConnectPath::Direct,
                })
            }
            Err(e) => {
                warn!(app_port = self.settings.app_port, error = %e, "conductor unreachable");
                Err(e)
            }
        };
        ConnectAttempt { trail, result }
    }

    async fn authenticated(
        &self,
        trail: &mut Vec<ConnectionState>,
    ) -> ConductorResult<Box<dyn AppSession>> {
        trail.push(ConnectionState::AdminHandshaking);
        debug!(admin_port = self.settings.admin_port, "connecting to admin interface");
        let admin = self.transport.connect_admin(self.settings.admin_port).await?;

        let token = admin.issue_app_token(APP_ID).await?;
        trail.push(ConnectionState::TokenIssued);

        let cells = admin.list_cell_ids().await?;
        debug!(cells = cells.len(), "listed cells");
        let cell = cells.first().ok_or(ConductorError::NoCells)?;
        admin.authorize_signing_credentials(cell).await?;
        trail.push(ConnectionState::CredentialsAuthorized);

        trail.push(ConnectionState::DataChannelConnecting);
        self.transport
            .connect_app(self.settings.app_port, Some(token))
            .await
    }
}
