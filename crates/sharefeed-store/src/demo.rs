use std::sync::RwLock;

use async_trait::async_trait;
use sharefeed_types::{now_ms, RetrievalOptions, ShareRecord};
use tokio::sync::broadcast;

use crate::error::StoreResult;
use crate::query::filter_records;
use crate::traits::ShareStore;

/// Author recorded on shares created through the demo backend.
pub const DEMO_USER: &str = "demo-user";

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// An in-memory backend seeded with sample shares.
///
/// Used to exercise a UI without a conductor or any persisted data.
/// Every mutation pushes the full record list to subscribers.
pub struct DemoShareStore {
    shares: RwLock<Vec<ShareRecord>>,
    updates: broadcast::Sender<Vec<ShareRecord>>,
}

impl DemoShareStore {
    /// Five sample shares, stamped relative to the current time.
    pub fn new() -> Self {
        Self::with_shares(sample_shares(now_ms()))
    }

    /// Create a demo store holding `shares`.
    pub fn with_shares(shares: Vec<ShareRecord>) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            shares: RwLock::new(shares),
            updates,
        }
    }

    /// Receive the full record list after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<ShareRecord>> {
        self.updates.subscribe()
    }

    fn notify(&self, shares: Vec<ShareRecord>) {
        // No subscribers is fine.
        let _ = self.updates.send(shares);
    }
}

impl Default for DemoShareStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShareStore for DemoShareStore {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn save_share(&self, mut record: ShareRecord) -> StoreResult<ShareRecord> {
        record.validate()?;
        record.shared_by = DEMO_USER.to_string();
        let snapshot = {
            let mut shares = self.shares.write().expect("lock poisoned");
            shares.insert(0, record.clone());
            shares.clone()
        };
        self.notify(snapshot);
        Ok(record)
    }

    async fn get_shares(&self, options: &RetrievalOptions) -> StoreResult<Vec<ShareRecord>> {
        let shares = self.shares.read().expect("lock poisoned").clone();
        Ok(filter_records(shares, options))
    }

    async fn delete_share(&self, id: &str) -> StoreResult<()> {
        let snapshot = {
            let mut shares = self.shares.write().expect("lock poisoned");
            let before = shares.len();
            shares.retain(|s| s.id != id);
            (shares.len() != before).then(|| shares.clone())
        };
        if let Some(snapshot) = snapshot {
            self.notify(snapshot);
        }
        Ok(())
    }
}

fn sample(
    id: &str,
    url: &str,
    title: &str,
    description: &str,
    shared_at: u64,
    shared_by: &str,
    tags: [&str; 2],
) -> ShareRecord {
    let mut record = ShareRecord::new(id, url, title, shared_at, shared_by);
    record.description = Some(description.to_string());
    record.tags = tags.iter().map(|t| t.to_string()).collect();
    record
}

fn sample_shares(now: u64) -> Vec<ShareRecord> {
    let mut shares = vec![
        sample(
            "demo-1",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "Never Gonna Give You Up - Rick Astley",
            "The official video for \"Never Gonna Give You Up\" by Rick Astley.",
            now.saturating_sub(10 * MINUTE_MS),
            "grandma",
            ["music", "classic"],
        ),
        sample(
            "demo-2",
            "https://www.nytimes.com/2024/01/15/technology/ai-future.html",
            "The Future of AI: What Experts Are Saying",
            "A comprehensive look at how artificial intelligence is shaping our world.",
            now.saturating_sub(2 * HOUR_MS),
            "uncle-bob",
            ["technology", "ai"],
        ),
        sample(
            "demo-3",
            "https://www.allrecipes.com/recipe/chocolate-chip-cookies/",
            "Best Chocolate Chip Cookies Ever",
            "Perfectly crispy on the outside and chewy on the inside.",
            now.saturating_sub(DAY_MS),
            "mom",
            ["recipes", "baking"],
        ),
        sample(
            "demo-4",
            "https://www.nationalgeographic.com/animals/mammals/facts/elephants",
            "Elephant Facts and Information",
            "The largest land animals on Earth, their behavior, habitat, and conservation status.",
            now.saturating_sub(2 * DAY_MS),
            "grandpa",
            ["nature", "animals"],
        ),
        sample(
            "demo-5",
            "https://www.webmd.com/healthy-aging/features/exercises-for-seniors",
            "10 Best Exercises for Seniors",
            "Simple exercises designed for older adults.",
            now.saturating_sub(3 * DAY_MS),
            "aunt-mary",
            ["health", "fitness"],
        ),
    ];
    shares[1].selection =
        Some("AI will fundamentally change how we work and live within the next decade.".into());
    shares[3].thumbnail =
        Some("https://images.unsplash.com/photo-1557050543-4d5f4e07ef46?w=300".into());
    shares
}
