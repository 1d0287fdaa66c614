pub mod store;
pub mod memory;
pub mod dbdocs;

pub use store::{SnapshotStore, StoreError};
pub use memory::MemorySnapshotStore;
pub use dbdocs::PgSnapshotStore;
