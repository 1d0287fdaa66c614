use tracing::{debug, info};

use crate::models::DocumentId;
use crate::session::{presence, relay};
use crate::websocket::connection::{Connection, ConnectionState};
use crate::AppState;

/// Remove the connection from its session and tell the rest of the session.
///
/// Returns the document that was left. Safe to call on a connection that is not bound.
pub async fn leave_session(state: &AppState, conn: &mut Connection) -> Option<DocumentId> {
    conn.state = ConnectionState::Unbound;
    let Some((doc, remaining)) = state.registry.leave(&conn.id).await else {
        debug!("Connection {} was not in a session", conn.id);
        return None;
    };

    info!("Connection {} left document {} ({} active)", conn.id, doc, remaining.len());
    relay::clear_cursor(&state.outbox, &conn.id, &remaining).await;
    presence::broadcast_presence(&state.outbox, &doc, &remaining).await;
    Some(doc)
}
