use serde_json::Value;
use tracing::debug;

use crate::models::Snapshot;
use crate::websocket::connection::Connection;
use crate::AppState;

/// Handle `save-document`, sent by clients on a fixed interval with their full content.
pub async fn handle_save_document(state: &AppState, conn: &Connection, content: Value) {
    let Some(doc) = conn.document() else {
        debug!("Ignoring save from unbound connection {}", conn.id);
        return;
    };
    state
        .lifecycle
        .on_periodic_report(&conn.id, doc, Snapshot(content))
        .await;
}
