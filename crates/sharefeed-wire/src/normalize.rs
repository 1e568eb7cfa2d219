use sharefeed_types::{micros_to_millis, ShareRecord};

use crate::local::LocalShareRecord;
use crate::remote::{RemoteShareInfo, RemoteShareItem};

/// The two concrete storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a backend is given when a record is written.
///
/// The remote payload carries no id, timestamp, or author: the conductor
/// assigns all three when the entry is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WirePayload {
    Local(LocalShareRecord),
    Remote(RemoteShareItem),
}

/// What a backend hands back when a record is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireRecord {
    Local(LocalShareRecord),
    Remote(RemoteShareInfo),
}

impl WireRecord {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local(_) => BackendKind::Local,
            Self::Remote(_) => BackendKind::Remote,
        }
    }
}

/// Shape a canonical record for the given backend.
pub fn to_wire(record: &ShareRecord, kind: BackendKind) -> WirePayload {
    match kind {
        BackendKind::Local => WirePayload::Local(to_local(record)),
        BackendKind::Remote => WirePayload::Remote(to_remote(record)),
    }
}

/// The local store's shape: the canonical record, field for field.
pub fn to_local(record: &ShareRecord) -> LocalShareRecord {
    LocalShareRecord {
        id: record.id.clone(),
        url: record.url.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        selection: record.selection.clone(),
        favicon: record.favicon.clone(),
        thumbnail: record.thumbnail.clone(),
        shared_at: record.shared_at,
        shared_by: record.shared_by.clone(),
        feed_id: record.feed_id.clone(),
        tags: record.tags.clone(),
    }
}

/// The conductor's entry payload. Identity, time, author, and feed are
/// not part of it.
pub fn to_remote(record: &ShareRecord) -> RemoteShareItem {
    RemoteShareItem {
        url: record.url.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        selection: record.selection.clone(),
        favicon: record.favicon.clone(),
        thumbnail: record.thumbnail.clone(),
        tags: record.tags.clone(),
    }
}

/// Rehydrate a canonical record from a backend's native shape.
///
/// Remote hashes are encoded to their string form and the microsecond
/// `created_at` becomes milliseconds. This is the only place that
/// conversion happens.
pub fn from_wire(wire: WireRecord) -> ShareRecord {
    match wire {
        WireRecord::Local(local) => ShareRecord {
            id: local.id,
            url: local.url,
            title: local.title,
            description: local.description,
            selection: local.selection,
            favicon: local.favicon,
            thumbnail: local.thumbnail,
            shared_at: local.shared_at,
            shared_by: local.shared_by,
            feed_id: local.feed_id,
            tags: local.tags,
        },
        WireRecord::Remote(info) => {
            let item = info.share_item;
            ShareRecord {
                id: info.action_hash.encode(),
                url: item.url,
                title: item.title,
                description: item.description,
                selection: item.selection,
                favicon: item.favicon,
                thumbnail: item.thumbnail,
                shared_at: micros_to_millis(info.created_at),
                shared_by: info.author.encode(),
                feed_id: None,
                tags: item.tags,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{encode_hash, LedgerHash};

    fn sample() -> ShareRecord {
        let mut record = ShareRecord::new("id-1", "https://a.com", "A", 3_000, "u1");
        record.selection = Some("quote".into());
        record.feed_id = Some("f1".into());
        record
    }

    #[test]
    fn remote_payload_uses_nulls_and_empty_tags() {
        let WirePayload::Remote(item) = to_wire(&sample(), BackendKind::Remote) else {
            panic!("expected remote payload");
        };
        assert_eq!(item.selection.as_deref(), Some("quote"));
        assert_eq!(item.description, None);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["favicon"].is_null());
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn local_payload_mirrors_record() {
        let record = sample();
        let WirePayload::Local(local) = to_wire(&record, BackendKind::Local) else {
            panic!("expected local payload");
        };
        assert_eq!(from_wire(WireRecord::Local(local)), record);
    }

    #[test]
    fn remote_microseconds_become_milliseconds() {
        let info = RemoteShareInfo {
            action_hash: LedgerHash::new(vec![7u8; 39]),
            share_item: RemoteShareItem {
                url: "https://a.com".into(),
                title: "A".into(),
                description: None,
                selection: Some("quote".into()),
                favicon: None,
                thumbnail: None,
                tags: vec!["t".into()],
            },
            created_at: 3_000_000,
            author: LedgerHash::new(vec![9u8; 39]),
        };
        let record = from_wire(WireRecord::Remote(info));
        assert_eq!(record.shared_at, 3_000);
        assert_eq!(record.id, encode_hash(&[7u8; 39]));
        assert_eq!(record.shared_by, encode_hash(&[9u8; 39]));
        assert_eq!(record.description, None);
        assert_eq!(record.selection.as_deref(), Some("quote"));
        assert_eq!(record.feed_id, None);
    }

    #[test]
    fn remote_null_never_becomes_empty_string() {
        let json = serde_json::json!({
            "action_hash": [1],
            "share_item": {
                "url": "https://a.com", "title": "A",
                "description": null, "selection": null, "favicon": null, "thumbnail": null,
                "tags": []
            },
            "created_at": 1_000,
            "author": [2],
        });
        let info: RemoteShareInfo = serde_json::from_value(json).unwrap();
        let record = from_wire(WireRecord::Remote(info));
        assert!(record.description.is_none());
        assert!(record.thumbnail.is_none());
        assert_eq!(record.shared_at, 1);
    }

    #[test]
    fn wire_record_reports_kind() {
        let WirePayload::Local(local) = to_wire(&sample(), BackendKind::Local) else {
            panic!("expected local payload");
        };
        assert_eq!(WireRecord::Local(local).kind(), BackendKind::Local);
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }
}
