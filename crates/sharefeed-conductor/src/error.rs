use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which conductor interface an operation targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interface {
    Admin,
    App,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::App => f.write_str("app"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("cannot reach {interface} interface on port {port}: {reason}")]
    Connect {
        interface: Interface,
        port: u16,
        reason: String,
    },

    #[error("app authentication token could not be issued: {0}")]
    TokenIssuance(String),

    #[error("no cells available to authorize signing credentials")]
    NoCells,

    #[error("signing credential authorization failed: {0}")]
    Authorization(String),

    #[error("app interface rejected authentication: {0}")]
    Authentication(String),

    #[error("remote function {function} failed: {message}")]
    CallFailed { function: String, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection closed by conductor")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type ConductorResult<T> = Result<T, ConductorError>;

impl From<serde_json::Error> for ConductorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
