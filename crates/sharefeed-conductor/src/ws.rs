//! WebSocket transport.
//!
//! Each request is a JSON [`Envelope`] sent as a text frame; the conductor
//! answers with an envelope carrying the same id. Requests on one session
//! are serialized, and every connect and request is bounded by the
//! transport's timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{ConductorError, ConductorResult, Interface};
use crate::message::{
    AdminRequest, AdminResponse, AppAuthToken, AppRequest, AppResponse, CellId, Envelope,
    RemoteCall, DEFAULT_REQUEST_TIMEOUT,
};
use crate::transport::{AdminSession, AppSession, ConductorTransport};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Conductor transport over `ws://<host>:<port>`.
#[derive(Clone, Debug)]
pub struct WsTransport {
    host: String,
    request_timeout: Duration,
}

impl WsTransport {
    /// Connect to a conductor on `localhost`.
    pub fn new() -> Self {
        Self {
            host: "localhost".into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Connect to `host` instead of localhost.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Bound on every connect and request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn url(&self, port: u16) -> String {
        format!("ws://{}:{}", self.host, port)
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConductorTransport for WsTransport {
    async fn connect_admin(&self, port: u16) -> ConductorResult<Box<dyn AdminSession>> {
        let channel =
            Channel::open(&self.url(port), Interface::Admin, port, self.request_timeout).await?;
        Ok(Box::new(WsAdmin { channel }))
    }

    async fn connect_app(
        &self,
        port: u16,
        token: Option<AppAuthToken>,
    ) -> ConductorResult<Box<dyn AppSession>> {
        let channel =
            Channel::open(&self.url(port), Interface::App, port, self.request_timeout).await?;
        if let Some(token) = token {
            match channel.request(AppRequest::Authenticate { token }).await? {
                AppResponse::Authenticated => {}
                AppResponse::Error { message } => {
                    return Err(ConductorError::Authentication(message));
                }
                other => return Err(unexpected(&other)),
            }
        }
        Ok(Box::new(WsApp { channel }))
    }
}

struct Channel {
    socket: Mutex<Socket>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl Channel {
    async fn open(
        url: &str,
        interface: Interface,
        port: u16,
        timeout: Duration,
    ) -> ConductorResult<Self> {
        debug!(%url, %interface, "opening websocket");
        let connect_err = |reason: String| ConductorError::Connect {
            interface,
            port,
            reason,
        };
        let (socket, _response) = tokio::time::timeout(timeout, connect_async(url))
            .await
            .map_err(|_| connect_err(format!("timed out after {timeout:?}")))?
            .map_err(|e| connect_err(e.to_string()))?;
        Ok(Self {
            socket: Mutex::new(socket),
            next_id: AtomicU64::new(1),
            timeout,
        })
    }

    async fn request<Req, Resp>(&self, body: Req) -> ConductorResult<Resp>
    where
        Req: Serialize + Send,
        Resp: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = serde_json::to_string(&Envelope { id, body })?;
        let mut socket = self.socket.lock().await;

        let exchange = async {
            socket
                .send(Message::Text(text))
                .await
                .map_err(|e| ConductorError::Protocol(e.to_string()))?;
            while let Some(frame) = socket.next().await {
                match frame.map_err(|e| ConductorError::Protocol(e.to_string()))? {
                    Message::Text(text) => {
                        let envelope: Envelope<Value> = serde_json::from_str(&text)?;
                        if envelope.id == id {
                            return Ok(serde_json::from_value(envelope.body)?);
                        }
                        debug!(expected = id, got = envelope.id, "skipping unrelated response");
                    }
                    Message::Close(_) => return Err(ConductorError::Closed),
                    _ => {}
                }
            }
            Err(ConductorError::Closed)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ConductorError::Timeout(self.timeout))?
    }
}

fn unexpected<T: std::fmt::Debug>(response: &T) -> ConductorError {
    ConductorError::Protocol(format!("unexpected response: {response:?}"))
}

struct WsAdmin {
    channel: Channel,
}

#[async_trait]
impl AdminSession for WsAdmin {
    async fn issue_app_token(&self, installed_app_id: &str) -> ConductorResult<AppAuthToken> {
        let request = AdminRequest::IssueAppAuthenticationToken {
            installed_app_id: installed_app_id.to_string(),
        };
        match self.channel.request(request).await? {
            AdminResponse::AppAuthenticationTokenIssued { token } => Ok(token),
            AdminResponse::Error { message } => Err(ConductorError::TokenIssuance(message)),
            other => Err(unexpected(&other)),
        }
    }

    async fn list_cell_ids(&self) -> ConductorResult<Vec<CellId>> {
        match self.channel.request(AdminRequest::ListCellIds).await? {
            AdminResponse::CellIdsListed(cells) => Ok(cells),
            AdminResponse::Error { message } => Err(ConductorError::Protocol(message)),
            other => Err(unexpected(&other)),
        }
    }

    async fn authorize_signing_credentials(&self, cell: &CellId) -> ConductorResult<()> {
        let request = AdminRequest::AuthorizeSigningCredentials {
            cell_id: cell.clone(),
        };
        match self.channel.request(request).await? {
            AdminResponse::SigningCredentialsAuthorized => Ok(()),
            AdminResponse::Error { message } => Err(ConductorError::Authorization(message)),
            other => Err(unexpected(&other)),
        }
    }
}

struct WsApp {
    channel: Channel,
}

#[async_trait]
impl AppSession for WsApp {
    async fn call(&self, call: RemoteCall) -> ConductorResult<Value> {
        let function = call.fn_name.clone();
        match self.channel.request(AppRequest::CallZome(call)).await? {
            AppResponse::ZomeCalled(value) => Ok(value),
            AppResponse::Error { message } => Err(ConductorError::CallFailed { function, message }),
            other => Err(unexpected(&other)),
        }
    }
}
