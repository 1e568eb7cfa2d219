use serde::Serialize;

/// How long a remote availability result is trusted.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 30_000;

/// Time-boxed memo of whether the remote backend was last reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCache {
    /// When the last probe finished; `None` means unknown.
    pub last_checked_at: Option<u64>,
    pub is_available: bool,
    pub check_interval_ms: u64,
}

impl AvailabilityCache {
    /// Create an unknown cache with the given interval.
    pub fn new(check_interval_ms: u64) -> Self {
        Self {
            last_checked_at: None,
            is_available: false,
            check_interval_ms,
        }
    }

    /// A fresh probe is due when more than the interval has passed since
    /// the last one, or when no probe has completed yet.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        match self.last_checked_at {
            None => true,
            Some(at) => now_ms.saturating_sub(at) > self.check_interval_ms,
        }
    }

    /// Store a probe result taken at `now_ms`.
    pub fn record(&mut self, now_ms: u64, available: bool) {
        self.last_checked_at = Some(now_ms);
        self.is_available = available;
    }

    /// Force the next resolution to probe, keeping the last answer.
    pub fn expire(&mut self) {
        self.last_checked_at = None;
    }

    /// Back to unknown and unavailable.
    pub fn reset(&mut self) {
        self.last_checked_at = None;
        self.is_available = false;
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_INTERVAL_MS)
    }
}
