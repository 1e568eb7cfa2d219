//! The inbound message contract for ShareFeed.
//!
//! UI surfaces talk to the core with small JSON messages of the form
//! `{"type": "...", "payload": ...}`. A [`ShareContext`] is built once per
//! process and owns the storage manager; every message is handled against
//! it. There is no global state.
//!
//! # Verbs
//!
//! | type                         | payload                        | response            |
//! |------------------------------|--------------------------------|---------------------|
//! | `GET_SHARES`                 | retrieval options (optional)   | `SHARES_RESPONSE`   |
//! | `SHARE_ITEM`                 | share draft                    | `SHARE_SUCCESS`     |
//! | `GET_CONNECTION_STATUS`      | none                           | `CONNECTION_STATUS` |
//! | `SET_STORAGE_MODE`           | `"local"`, `"remote"`, `"auto"`| `ACK`               |
//! | `RESET_CONNECTION`           | none                           | `ACK`               |
//! | `GET_SHARE`                  | id                             | `SHARE_RESPONSE`    |
//! | `DELETE_SHARE`               | id                             | `ACK`               |
//! | `UPDATE_CONNECTION_SETTINGS` | partial settings               | `CONNECTION_SETTINGS` |
//!
//! Failures answer `SHARE_ERROR`. A failed share reports a generic message;
//! the cause is logged.

pub mod capture;
pub mod context;
pub mod error;
pub mod message;

pub use capture::{
    draft_for, is_shareable, share_notification, truncate, CaptureContext, PageMetadata,
};
pub use context::{ShareContext, DEFAULT_STATUS_TIMEOUT, SHARE_FAILED};
pub use error::{ServiceError, ServiceResult};
pub use message::{types, Message, Response};
