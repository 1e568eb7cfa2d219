//! The query/filter engine.
//!
//! One pure function, shared by every backend's read path. The order of
//! operations is fixed:
//!
//! 1. sort newest-first by `shared_at`
//! 2. keep only `feed_id` matches, if requested
//! 3. keep only records strictly older than `after`, if requested
//! 4. truncate to `limit`, if requested
//!
//! Reordering these steps changes results once a limit is combined with
//! either filter.

use sharefeed_types::{RetrievalOptions, ShareRecord};

/// Apply `options` to a record list.
///
/// The sort is stable: records with equal `shared_at` keep their input
/// order, so the local store's insertion-at-head order breaks ties.
pub fn filter_records(
    mut records: Vec<ShareRecord>,
    options: &RetrievalOptions,
) -> Vec<ShareRecord> {
    records.sort_by(|a, b| b.shared_at.cmp(&a.shared_at));

    if let Some(feed) = options.feed_id.as_deref() {
        records.retain(|r| r.feed_id.as_deref() == Some(feed));
    }
    if let Some(after) = options.after {
        records.retain(|r| r.shared_at < after);
    }
    if let Some(limit) = options.limit {
        records.truncate(limit);
    }
    records
}
