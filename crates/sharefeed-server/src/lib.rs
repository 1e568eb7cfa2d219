//! Local HTTP surface for ShareFeed.
//!
//! Serves the inbound message contract to browser UIs that cannot reach
//! the core in-process.
//!
//! | method | path           | body / query        | reply                    |
//! |--------|----------------|---------------------|--------------------------|
//! | GET    | `/v1/health`   |                     | `{status, version}`      |
//! | GET    | `/v1/info`     |                     | name, version, verbs     |
//! | POST   | `/v1/message`  | `{type, payload}`   | `{type, payload}`        |
//! | GET    | `/v1/shares`   | `feedId, limit, after` | share records         |
//! | GET    | `/v1/status`   |                     | connection status        |

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::SharefeedServer;
