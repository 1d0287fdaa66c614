use tracing::debug;

use crate::models::CursorReport;
use crate::session::relay;
use crate::websocket::connection::Connection;
use crate::AppState;

/// Handle `send-cursor`
pub async fn handle_send_cursor(state: &AppState, conn: &Connection, report: CursorReport) {
    let Some(doc) = conn.document() else {
        debug!("Dropping cursor from unbound connection {}", conn.id);
        return;
    };
    relay::relay_cursor(
        &state.registry,
        &state.outbox,
        &conn.id,
        doc,
        report.display_name,
        report.range,
    )
    .await;
}
