use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{LocalUserId, ShareId};

/// Title given to a share captured without one.
pub const UNTITLED: &str = "Untitled";

/// The canonical, backend-independent share record.
///
/// Field names serialize in camelCase so the record can be handed to the
/// extension and web UI unchanged. Absent optional fields are omitted
/// rather than written as `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    /// Opaque identifier, unique within the backend that produced it.
    pub id: String,
    /// The shared URL.
    pub url: String,
    /// Page title. Never empty once a record has been built.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Text the user highlighted on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Encoded favicon image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Encoded thumbnail image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Milliseconds since the UNIX epoch.
    pub shared_at: u64,
    /// Opaque author identifier.
    pub shared_by: String,
    /// Target feed; `None` is the personal feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ShareRecord {
    /// Create a record with only the required fields populated.
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        shared_at: u64,
        shared_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            description: None,
            selection: None,
            favicon: None,
            thumbnail: None,
            shared_at,
            shared_by: shared_by.into(),
            feed_id: None,
            tags: Vec::new(),
        }
    }

    /// Builder-style feed assignment.
    pub fn in_feed(mut self, feed_id: impl Into<String>) -> Self {
        self.feed_id = Some(feed_id.into());
        self
    }

    /// Check the required fields a backend relies on.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.url.trim().is_empty() {
            return Err(TypeError::MissingUrl);
        }
        if self.title.is_empty() {
            return Err(TypeError::MissingTitle);
        }
        if self.id.is_empty() {
            return Err(TypeError::MissingId);
        }
        Ok(())
    }
}

/// A share as submitted by a capture surface, before an identity,
/// timestamp, and author are assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDraft {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ShareDraft {
    /// Start a draft for `url` with the given title.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Turn the draft into a canonical record.
    ///
    /// Rejects a blank URL. An empty title becomes [`UNTITLED`] here, before
    /// the record is handed to any backend.
    pub fn into_record(
        self,
        id: ShareId,
        shared_at: u64,
        shared_by: &LocalUserId,
    ) -> Result<ShareRecord, TypeError> {
        if self.url.trim().is_empty() {
            return Err(TypeError::MissingUrl);
        }
        let title = if self.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            self.title
        };
        Ok(ShareRecord {
            id: id.into_string(),
            url: self.url,
            title,
            description: self.description,
            selection: self.selection,
            favicon: self.favicon,
            thumbnail: self.thumbnail,
            shared_at,
            shared_by: shared_by.as_str().to_string(),
            feed_id: self.feed_id,
            tags: self.tags,
        })
    }
}
