//! Storage adapters for ShareFeed.
//!
//! Every backend implements the [`ShareStore`] trait and speaks canonical
//! [`ShareRecord`]s. Backend-native shapes never leave the adapter: the
//! normalizer in `sharefeed-wire` is applied at the boundary.
//!
//! # Backends
//!
//! - [`LocalShareStore`]: one ordered JSON list in a [`KeyValueStore`]
//! - [`RemoteShareStore`]: the ledger conductor, reconnected on every call
//! - [`DemoShareStore`]: seeded in-memory records with push notifications
//!
//! # Reads
//!
//! All read paths go through [`filter_records`], so feed scoping, cursor
//! pagination and limits behave the same whichever backend answers.
//!
//! [`ShareRecord`]: sharefeed_types::ShareRecord

pub mod demo;
pub mod error;
pub mod identity;
pub mod kv;
pub mod local;
pub mod query;
pub mod remote;
pub mod traits;
pub mod watch;

pub use demo::DemoShareStore;
pub use error::{StoreError, StoreResult};
pub use identity::local_user_id;
pub use kv::{keys, JsonFileStore, KeyValueStore, MemoryKeyValueStore};
pub use local::LocalShareStore;
pub use query::filter_records;
pub use remote::RemoteShareStore;
pub use traits::ShareStore;
pub use watch::FeedWatcher;
