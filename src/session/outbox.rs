use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::models::{ConnectionId, ServerEvent};

/// Outbound channel of every live connection, addressable by connection id.
///
/// Each connection gets its own unbounded queue, drained in order by its socket writer.
#[derive(Default)]
pub struct Outbox {
    senders: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn: &ConnectionId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.write().await.insert(conn.clone(), tx);
        rx
    }

    /// Drop the sender so the writer finishes once it has flushed what is queued.
    pub async fn unregister(&self, conn: &ConnectionId) {
        self.senders.write().await.remove(conn);
    }

    pub async fn emit(&self, conn: &ConnectionId, event: ServerEvent) {
        let senders = self.senders.read().await;
        match senders.get(conn) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!("Connection {} writer is gone", conn);
                }
            }
            None => warn!("Dropping '{}' for unknown connection {}", event.name(), conn),
        }
    }

    /// Send `event` to every address except `except`.
    pub async fn broadcast<'a, I>(&self, addresses: I, except: Option<&ConnectionId>, event: ServerEvent)
    where
        I: IntoIterator<Item = &'a ConnectionId>,
    {
        let senders = self.senders.read().await;
        for conn in addresses {
            if Some(conn) == except {
                continue;
            }
            if let Some(tx) = senders.get(conn) {
                if tx.send(event.clone()).is_err() {
                    debug!("Connection {} writer is gone", conn);
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }
}
