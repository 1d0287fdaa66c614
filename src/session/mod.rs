pub mod registry;
pub mod outbox;
pub mod presence;
pub mod relay;
pub mod lifecycle;
pub mod error;

pub use registry::SessionRegistry;
pub use outbox::Outbox;
pub use lifecycle::SnapshotLifecycle;
pub use error::SessionError;
