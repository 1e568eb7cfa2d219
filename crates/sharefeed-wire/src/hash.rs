use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Raw hash bytes as reported by the remote ledger (action hashes, agent keys).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerHash(pub Vec<u8>);

impl LedgerHash {
    /// Wrap raw hash bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Stable string form used as a record id or author id.
    pub fn encode(&self) -> String {
        encode_hash(&self.0)
    }
}

impl fmt::Debug for LedgerHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerHash({})", self.encode())
    }
}

/// Encode hash bytes as `u` + unpadded URL-safe base64.
pub fn encode_hash(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(1 + bytes.len().div_ceil(3) * 4);
    out.push('u');
    out.push_str(&URL_SAFE_NO_PAD.encode(bytes));
    out
}
