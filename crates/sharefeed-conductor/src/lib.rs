//! Remote ledger conductor client for ShareFeed.
//!
//! The conductor exposes two WebSocket interfaces: an **admin** interface
//! used to issue app authentication tokens and authorize signing
//! credentials, and an **app** interface that carries remote function
//! calls. This crate models both behind async traits so the storage layer
//! never depends on a concrete socket.
//!
//! # Connection state machine
//!
//! ```text
//! Disconnected -> AdminHandshaking -> TokenIssued -> CredentialsAuthorized
//!              -> DataChannelConnecting -> Connected
//! Disconnected -> DataChannelConnecting -> Connected      (no admin port)
//! ```
//!
//! Any failure on the admin path falls through to the direct path. A
//! failure on the direct path ends the attempt as "not connected".
//! [`Connector`] drives this machine; it holds no connection between calls.
//!
//! # Transports
//!
//! - [`WsTransport`]: JSON request/response envelopes over WebSocket
//! - [`InMemoryConductor`]: in-process conductor for tests and demos

pub mod connection;
pub mod error;
pub mod memory;
pub mod message;
pub mod transport;
pub mod ws;

pub use connection::{ConnectAttempt, ConnectPath, Connection, ConnectionState, Connector};
pub use error::{ConductorError, ConductorResult, Interface};
pub use memory::InMemoryConductor;
pub use message::{
    functions, AppAuthToken, CellId, RemoteCall, APP_ID, DEFAULT_REQUEST_TIMEOUT, ROLE_NAME,
    ZOME_NAME,
};
pub use transport::{AdminSession, AppSession, ConductorTransport};
pub use ws::WsTransport;
