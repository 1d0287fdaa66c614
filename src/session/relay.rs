use serde_json::Value;
use tracing::debug;

use crate::models::{ConnectionId, CursorUpdate, DocumentId, ServerEvent};
use crate::session::{Outbox, SessionRegistry};

/// Forward an edit from `sender` to every other member of `doc`.
///
/// Edits from one sender are pushed onto the recipients' queues in the order this is called,
/// and each queue is drained in order.
pub async fn relay_edit(
    registry: &SessionRegistry,
    outbox: &Outbox,
    sender: &ConnectionId,
    doc: &DocumentId,
    operation: Value,
) {
    let members = registry.members_of(doc).await;
    debug!("Relaying edit from {} to {} peer(s) on {}", sender, members.len().saturating_sub(1), doc);
    outbox
        .broadcast(&members, Some(sender), ServerEvent::ReceiveChanges(operation))
        .await;
}

/// Forward a cursor or selection from `sender` to every other member of `doc`.
///
/// A `None` range clears the indicator shown for `sender`.
pub async fn relay_cursor(
    registry: &SessionRegistry,
    outbox: &Outbox,
    sender: &ConnectionId,
    doc: &DocumentId,
    display_name: String,
    range: Option<Value>,
) {
    let members = registry.members_of(doc).await;
    let update = CursorUpdate {
        connection_id: sender.clone(),
        display_name,
        range,
    };
    outbox
        .broadcast(&members, Some(sender), ServerEvent::UpdateCursor(update))
        .await;
}

/// Tell the remaining members of a session to drop the cursor of a connection that left.
pub async fn clear_cursor<'a, I>(outbox: &Outbox, gone: &ConnectionId, remaining: I)
where
    I: IntoIterator<Item = &'a ConnectionId>,
{
    outbox
        .broadcast(remaining, Some(gone), ServerEvent::UserDisconnected(gone.clone()))
        .await;
}
