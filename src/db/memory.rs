use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::store::{SnapshotStore, StoreError};
use crate::models::{DocumentId, Snapshot};

/// Process-local snapshot store. Contents are lost on restart.
#[derive(Default)]
pub struct MemorySnapshotStore {
    docs: RwLock<HashMap<DocumentId, Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, id: &DocumentId) -> Result<Snapshot, StoreError> {
        self.docs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create(&self, id: &DocumentId, initial: Snapshot) -> Result<Snapshot, StoreError> {
        let mut docs = self.docs.write().await;
        let snapshot = docs.entry(id.clone()).or_insert(initial).clone();
        debug!("Created document '{}' in memory", id);
        Ok(snapshot)
    }

    async fn update(&self, id: &DocumentId, snapshot: Snapshot) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(slot) => {
                *slot = snapshot;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}
