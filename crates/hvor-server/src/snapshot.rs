//! The published page.
//!
//! Readers always see a complete [`Snapshot`]: publication swaps an `Arc`
//! inside a watch channel, so a request holds on to the snapshot it started
//! with even if a refresh lands meanwhile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use hvor_core::Page;

/// A classified page and the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub page: Page,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a snapshot fetched at the page's generation time.
    pub fn new(page: Page) -> Self {
        let fetched_at = page.generated_at;
        Self { page, fetched_at }
    }
}

/// Holds the most recently published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    tx: Arc<watch::Sender<Option<Arc<Snapshot>>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Returns the current snapshot, if one was ever published.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.tx.borrow().clone()
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        debug!(
            fetched_at = %snapshot.fetched_at,
            events = snapshot.page.len(),
            "Publishing snapshot"
        );
        self.tx.send_replace(Some(snapshot.clone()));
        snapshot
    }
}
