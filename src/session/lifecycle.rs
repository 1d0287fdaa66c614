use std::sync::Arc;
use tracing::{error, info};

use crate::db::{SnapshotStore, StoreError};
use crate::models::{ConnectionId, DocumentId, Snapshot};

/// Loads snapshots for joining connections and persists the content they report back.
#[derive(Clone)]
pub struct SnapshotLifecycle {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotLifecycle {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Fetch the snapshot a joining connection starts from, creating an empty document the
    /// first time `doc` is opened. Storage failures are returned so the join can be refused.
    pub async fn on_join(&self, conn: &ConnectionId, doc: &DocumentId) -> Result<Snapshot, StoreError> {
        match self.store.find_or_create(doc).await {
            Ok(snapshot) => {
                info!("Loaded document {} for connection {}", doc, conn);
                Ok(snapshot)
            }
            Err(e) => {
                error!("Failed to load document {} for connection {}: {}", doc, conn, e);
                Err(e)
            }
        }
    }

    /// Overwrite the stored snapshot with what a client currently holds.
    ///
    /// Failures are only logged; the client's next report retries with newer content.
    pub async fn on_periodic_report(&self, conn: &ConnectionId, doc: &DocumentId, content: Snapshot) {
        if let Err(e) = self.store.update(doc, content).await {
            error!("Failed to save document {} reported by {}: {}", doc, conn, e);
        }
    }
}
