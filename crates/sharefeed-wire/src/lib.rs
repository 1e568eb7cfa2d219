//! Record normalizer for ShareFeed.
//!
//! Each storage backend has its own native record shape:
//!
//! - The **local** store persists a JSON array of records that mirrors the
//!   canonical shape, with absent optional fields omitted.
//! - The **remote** conductor speaks a nullable wire shape: every optional
//!   field is sent as an explicit `null`, identifiers are raw hash bytes, and
//!   timestamps are microseconds.
//!
//! This crate owns the only translation between those shapes and
//! [`ShareRecord`]. All functions are pure and total; malformed optional
//! fields degrade to absent instead of failing the record.
//!
//! [`ShareRecord`]: sharefeed_types::ShareRecord

pub mod hash;
mod lenient;
pub mod local;
pub mod normalize;
pub mod remote;

pub use hash::{encode_hash, LedgerHash};
pub use local::LocalShareRecord;
pub use normalize::{from_wire, to_local, to_remote, to_wire, BackendKind, WirePayload, WireRecord};
pub use remote::{RemoteShareInfo, RemoteShareItem};
