use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Default port of the local ShareFeed server.
pub const DEFAULT_PORT: u16 = 7311;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Allow any origin, so a UI served from elsewhere can call in.
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            permissive_cors: true,
        }
    }
}
