//! Store doubles shared by unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::db::{MemorySnapshotStore, SnapshotStore, StoreError};
use crate::models::{DocumentId, Snapshot};
use crate::AppState;

/// In-memory store that counts how many documents it created.
#[derive(Default)]
pub struct CountingStore {
    inner: MemorySnapshotStore,
    creates: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for CountingStore {
    async fn load(&self, id: &DocumentId) -> Result<Snapshot, StoreError> {
        self.inner.load(id).await
    }

    async fn create(&self, id: &DocumentId, initial: Snapshot) -> Result<Snapshot, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(id, initial).await
    }

    async fn update(&self, id: &DocumentId, snapshot: Snapshot) -> Result<(), StoreError> {
        self.inner.update(id, snapshot).await
    }
}

/// Store whose backend can never be reached.
pub struct UnreachableStore;

#[async_trait]
impl SnapshotStore for UnreachableStore {
    async fn load(&self, _id: &DocumentId) -> Result<Snapshot, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create(&self, _id: &DocumentId, _initial: Snapshot) -> Result<Snapshot, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update(&self, _id: &DocumentId, _snapshot: Snapshot) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// In-memory store whose `load` parks until the test opens the gate.
#[derive(Default)]
pub struct GatedStore {
    inner: MemorySnapshotStore,
    entered: Notify,
    gate: Notify,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a `load` is parked at the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl SnapshotStore for GatedStore {
    async fn load(&self, id: &DocumentId) -> Result<Snapshot, StoreError> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.inner.load(id).await
    }

    async fn create(&self, id: &DocumentId, initial: Snapshot) -> Result<Snapshot, StoreError> {
        self.inner.create(id, initial).await
    }

    async fn update(&self, id: &DocumentId, snapshot: Snapshot) -> Result<(), StoreError> {
        self.inner.update(id, snapshot).await
    }
}

pub fn memory_state() -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(MemorySnapshotStore::new())))
}
