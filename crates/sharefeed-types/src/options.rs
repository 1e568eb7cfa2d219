use serde::{Deserialize, Serialize};

/// Options for reading shares from any backend.
///
/// All fields are optional; `None` means "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOptions {
    /// Exact-match feed filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    /// Maximum number of records, applied last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Exclusive upper bound on `sharedAt`: only strictly older records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<u64>,
}

impl RetrievalOptions {
    /// No filtering at all.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only shares in `feed_id`.
    pub fn feed(mut self, feed_id: impl Into<String>) -> Self {
        self.feed_id = Some(feed_id.into());
        self
    }

    /// At most `limit` shares.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only shares strictly older than `cursor_ms`.
    pub fn after(mut self, cursor_ms: u64) -> Self {
        self.after = Some(cursor_ms);
        self
    }
}
