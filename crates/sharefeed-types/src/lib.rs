//! Foundation types for ShareFeed.
//!
//! This crate provides the canonical, backend-independent data model shared
//! by every other ShareFeed crate. Storage backends translate their native
//! wire shapes to and from these types at their boundary; nothing downstream
//! ever sees a backend-specific representation.
//!
//! # Key Types
//!
//! - [`ShareRecord`]: A captured page, link, selection, or image
//! - [`ShareDraft`]: A record before identity and timestamp are assigned
//! - [`RetrievalOptions`]: Feed scoping, cursor pagination, and result limit
//! - [`StorageMode`]: Which backend the storage manager routes to
//! - [`ConnectionSettings`]: Ports and enable flag for the remote conductor
//! - [`ShareId`] / [`LocalUserId`]: Random UUID identifiers for local records

pub mod error;
pub mod identity;
pub mod options;
pub mod record;
pub mod settings;
pub mod temporal;

pub use error::TypeError;
pub use identity::{LocalUserId, ShareId};
pub use options::RetrievalOptions;
pub use record::{ShareDraft, ShareRecord, UNTITLED};
pub use settings::{ConnectionSettings, ConnectionSettingsUpdate, StorageMode};
pub use temporal::{micros_to_millis, now_ms, MICROS_PER_MILLI};
