//! Live updates by polling.
//!
//! A [`FeedWatcher`] reads a store on a fixed interval and publishes the
//! result over a broadcast channel whenever it differs from the previous
//! read. Receivers may see the same records again across publishes and
//! must treat each message as a full replacement.

use std::sync::Arc;
use std::time::Duration;

use sharefeed_types::{RetrievalOptions, ShareRecord};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::traits::ShareStore;

const CHANNEL_CAPACITY: usize = 16;

/// Polls a [`ShareStore`] and publishes changes.
///
/// The polling task stops when the watcher is dropped.
pub struct FeedWatcher {
    updates: broadcast::Sender<Vec<ShareRecord>>,
    task: JoinHandle<()>,
}

impl FeedWatcher {
    /// Start polling `store` every `interval`.
    ///
    /// The first poll runs immediately. The returned receiver is subscribed
    /// before the task starts, so it sees that first result.
    pub fn spawn(
        store: Arc<dyn ShareStore>,
        options: RetrievalOptions,
        interval: Duration,
    ) -> (Self, broadcast::Receiver<Vec<ShareRecord>>) {
        let (updates, receiver) = broadcast::channel(CHANNEL_CAPACITY);
        let tx = updates.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Vec<ShareRecord>> = None;
            loop {
                ticker.tick().await;
                match store.get_shares(&options).await {
                    Ok(records) => {
                        if last.as_ref() == Some(&records) {
                            continue;
                        }
                        debug!(backend = store.name(), count = records.len(), "feed changed");
                        // Nobody listening right now is fine.
                        let _ = tx.send(records.clone());
                        last = Some(records);
                    }
                    Err(e) => warn!(
                        backend = store.name(),
                        error = %e,
                        "feed poll failed; keeping last result"
                    ),
                }
            }
        });
        (Self { updates, task }, receiver)
    }

    /// Another receiver for the same updates.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<ShareRecord>> {
        self.updates.subscribe()
    }
}

impl Drop for FeedWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
