use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{ConnectionId, DocumentId};

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<DocumentId, HashSet<ConnectionId>>,
    bindings: HashMap<ConnectionId, DocumentId>,
}

/// Which connections are viewing which document.
///
/// A connection belongs to at most one session. Sessions exist only while they have
/// members; nothing here survives a restart.
#[derive(Default)]
pub struct SessionRegistry {
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to the session of `doc` and return the members right after the change.
    ///
    /// A missing document id is a no-op and yields `None`. If `conn` was bound to another
    /// document it is moved, so it never sits in two sessions.
    pub async fn join(
        &self,
        conn: &ConnectionId,
        doc: Option<&DocumentId>,
    ) -> Option<HashSet<ConnectionId>> {
        let doc = doc?;
        let mut state = self.state.write().await;

        if let Some(previous) = state.bindings.insert(conn.clone(), doc.clone()) {
            if &previous != doc {
                remove_member(&mut state.sessions, &previous, conn);
            }
        }

        let members = state.sessions.entry(doc.clone()).or_default();
        members.insert(conn.clone());
        debug!("Connection {} joined {} ({} members)", conn, doc, members.len());
        Some(members.clone())
    }

    /// Remove `conn` from its session, returning the document it left and the members that
    /// remain. Calling it again for the same connection returns `None`.
    pub async fn leave(&self, conn: &ConnectionId) -> Option<(DocumentId, HashSet<ConnectionId>)> {
        let mut state = self.state.write().await;
        let doc = state.bindings.remove(conn)?;
        let remaining = remove_member(&mut state.sessions, &doc, conn);
        debug!("Connection {} left {} ({} remaining)", conn, doc, remaining.len());
        Some((doc, remaining))
    }

    pub async fn members_of(&self, doc: &DocumentId) -> HashSet<ConnectionId> {
        self.state
            .read()
            .await
            .sessions
            .get(doc)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn count_of(&self, doc: &DocumentId) -> usize {
        self.state
            .read()
            .await
            .sessions
            .get(doc)
            .map_or(0, HashSet::len)
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    pub async fn bound_count(&self) -> usize {
        self.state.read().await.bindings.len()
    }
}

fn remove_member(
    sessions: &mut HashMap<DocumentId, HashSet<ConnectionId>>,
    doc: &DocumentId,
    conn: &ConnectionId,
) -> HashSet<ConnectionId> {
    let Some(members) = sessions.get_mut(doc) else {
        return HashSet::new();
    };
    members.remove(conn);
    if members.is_empty() {
        sessions.remove(doc);
        return HashSet::new();
    }
    members.clone()
}
