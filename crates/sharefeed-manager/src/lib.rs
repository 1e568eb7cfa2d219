//! Storage manager for ShareFeed.
//!
//! The [`StorageManager`] decides, per operation, whether the local store or
//! the remote conductor serves it:
//!
//! | mode     | remote disabled        | remote reachable | remote unreachable        |
//! |----------|------------------------|------------------|---------------------------|
//! | `local`  | local                  | local            | local                     |
//! | `auto`   | local, no probe        | remote           | local (silent fallback)   |
//! | `remote` | `BackendUnavailable`   | remote           | `BackendUnavailable`      |
//!
//! Reachability is remembered in an [`AvailabilityCache`] for a fixed
//! interval, so the multi-step connection handshake runs at most once per
//! interval rather than once per call. Changing the mode or the connection
//! settings resets the cache.

pub mod cache;
pub mod clock;
pub mod error;
pub mod manager;
pub mod settings;

pub use cache::{AvailabilityCache, DEFAULT_CHECK_INTERVAL_MS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ManagerError, ManagerResult};
pub use manager::{ConnectionStatus, StorageManager};
pub use settings::SettingsRepository;
