use serde_json::Value;
use tracing::debug;

use crate::session::relay;
use crate::websocket::connection::Connection;
use crate::AppState;

/// Handle `send-changes`
pub async fn handle_send_changes(state: &AppState, conn: &Connection, operation: Value) {
    let Some(doc) = conn.document() else {
        debug!("Dropping edit from unbound connection {}", conn.id);
        return;
    };
    relay::relay_edit(&state.registry, &state.outbox, &conn.id, doc, operation).await;
}
