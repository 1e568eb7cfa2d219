use serde::{Deserialize, Serialize};

use crate::hash::LedgerHash;
use crate::lenient;

/// The entry payload accepted by the conductor's `create_share_item`.
///
/// Every optional field is always present on the wire, as `null` when
/// absent, and `tags` is always a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteShareItem {
    pub url: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub selection: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub favicon: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

/// A committed share as listed by `get_recent_shares`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteShareInfo {
    pub action_hash: LedgerHash,
    pub share_item: RemoteShareItem,
    /// Microseconds since the UNIX epoch.
    pub created_at: i64,
    pub author: LedgerHash,
}
