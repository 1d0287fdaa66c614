use async_trait::async_trait;
use tracing::info;

use crate::models::{DocumentId, Snapshot};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document '{0}' not found")]
    NotFound(DocumentId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of document snapshots between sessions.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot, or `StoreError::NotFound` if the document was never created.
    async fn load(&self, id: &DocumentId) -> Result<Snapshot, StoreError>;

    /// Persist a new document. If another caller created it first, the existing snapshot
    /// is returned instead.
    async fn create(&self, id: &DocumentId, initial: Snapshot) -> Result<Snapshot, StoreError>;

    /// Overwrite the snapshot of an existing document.
    async fn update(&self, id: &DocumentId, snapshot: Snapshot) -> Result<(), StoreError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Load a document, creating it empty when it does not exist yet.
    ///
    /// Any failure other than "not found" is returned as-is; it never turns into an
    /// empty document.
    async fn find_or_create(&self, id: &DocumentId) -> Result<Snapshot, StoreError> {
        match self.load(id).await {
            Err(StoreError::NotFound(_)) => {
                info!("Document '{}' not found, creating it", id);
                self.create(id, Snapshot::empty()).await
            }
            other => other,
        }
    }
}
