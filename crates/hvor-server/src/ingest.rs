//! Fetch, decode, classify, publish.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use hvor_core::{Page, classify};
use hvor_feed::{FeedSource, parse_feed};

use crate::error::ServerResult;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Builds pages from a feed source and publishes them.
#[derive(Clone)]
pub struct Ingestor {
    source: Arc<dyn FeedSource>,
    store: SnapshotStore,
}

impl Ingestor {
    pub fn new(source: Arc<dyn FeedSource>, store: SnapshotStore) -> Self {
        Self { source, store }
    }

    /// Fetches the feed and classifies it against `now`.
    ///
    /// Does not touch the store.
    ///
    /// # Errors
    ///
    /// [`ServerError::Feed`](crate::ServerError::Feed) when fetching or parsing
    /// fails, [`ServerError::Classify`](crate::ServerError::Classify) when an
    /// entry cannot be decoded.
    pub async fn refresh(&self, now: DateTime<Utc>) -> ServerResult<Page> {
        let bytes = self.source.fetch().await?;
        let entries = parse_feed(&bytes)?;
        Ok(classify(&entries, now)?)
    }

    /// Refreshes against the current time and publishes the result.
    ///
    /// On failure the previously published snapshot stays in place.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn refresh_and_publish(&self) -> ServerResult<Arc<Snapshot>> {
        let page = self.refresh(Utc::now()).await?;
        let snapshot = self.store.publish(Snapshot::new(page));
        info!(
            past = snapshot.page.past.len(),
            future = snapshot.page.future.len(),
            current = snapshot.page.current.as_ref().map(|e| e.summary.as_str()),
            "Calendar refreshed"
        );
        Ok(snapshot)
    }
}
