//! Millisecond timestamps.
//!
//! The canonical unit for `sharedAt` is milliseconds since the UNIX epoch.
//! Backends that report another unit convert exactly once, at their adapter
//! boundary, using the helpers here.

use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds per millisecond.
pub const MICROS_PER_MILLI: i64 = 1_000;

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Convert a microsecond timestamp to whole milliseconds.
///
/// Pre-epoch values clamp to zero.
pub fn micros_to_millis(micros: i64) -> u64 {
    if micros <= 0 {
        return 0;
    }
    (micros / MICROS_PER_MILLI) as u64
}
