use crate::models::{ConnectionId, DocumentId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unbound,
    Bound(DocumentId),
}

/// Per-socket state owned by the task reading that socket.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub state: ConnectionState,
}

impl Connection {
    pub fn new() -> Self {
        Self::with_id(ConnectionId::generate())
    }

    pub fn with_id(id: ConnectionId) -> Self {
        Self {
            id,
            state: ConnectionState::Unbound,
        }
    }

    pub fn document(&self) -> Option<&DocumentId> {
        match &self.state {
            ConnectionState::Bound(doc) => Some(doc),
            ConnectionState::Unbound => None,
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}
