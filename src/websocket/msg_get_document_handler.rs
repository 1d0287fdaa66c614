use tracing::{debug, info};

use crate::models::{DocumentId, ErrorMessage, ServerEvent};
use crate::session::{presence, SessionError};
use crate::websocket::connection::{Connection, ConnectionState};
use crate::websocket::msg_leave_handler::leave_session;
use crate::AppState;

/// Handle `get-document`: load the snapshot, hand it to the requester and join the session.
pub async fn handle_get_document(
    state: &AppState,
    conn: &mut Connection,
    raw_id: Option<String>,
) -> Result<(), SessionError> {
    let Some(doc) = DocumentId::parse(raw_id) else {
        debug!("Ignoring get-document without a document id from {}", conn.id);
        return Ok(());
    };

    let snapshot = match state.lifecycle.on_join(&conn.id, &doc).await {
        Ok(snapshot) => snapshot,
        Err(source) => {
            let err = SessionError::JoinFailed { doc, source };
            state
                .outbox
                .emit(&conn.id, ServerEvent::Error(ErrorMessage { message: err.to_string() }))
                .await;
            return Err(err);
        }
    };

    if conn.document() == Some(&doc) {
        // Already a member, just resend the content
        state.outbox.emit(&conn.id, ServerEvent::LoadDocument(snapshot)).await;
        return Ok(());
    }

    if conn.document().is_some() {
        leave_session(state, conn).await;
    }

    // Queued before membership exists, so it precedes any edit relayed to this connection
    state.outbox.emit(&conn.id, ServerEvent::LoadDocument(snapshot)).await;

    if let Some(members) = state.registry.join(&conn.id, Some(&doc)).await {
        info!("Connection {} joined document {} ({} active)", conn.id, doc, members.len());
        presence::broadcast_presence(&state.outbox, &doc, &members).await;
    }
    conn.state = ConnectionState::Bound(doc);
    Ok(())
}
