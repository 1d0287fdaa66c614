use std::collections::HashSet;
use tracing::debug;

use crate::models::{ConnectionId, DocumentId, ServerEvent};
use crate::session::{Outbox, SessionRegistry};

/// Number of connections currently viewing `doc`, read from live membership.
pub async fn active_users(registry: &SessionRegistry, doc: &DocumentId) -> usize {
    registry.count_of(doc).await
}

/// Send the size of `members` to every one of them.
///
/// `members` must be the membership captured by the mutation that triggered the broadcast,
/// so the count always matches a state the registry actually had.
pub async fn broadcast_presence(outbox: &Outbox, doc: &DocumentId, members: &HashSet<ConnectionId>) {
    let count = members.len();
    debug!("Presence for {}: {} active", doc, count);
    outbox
        .broadcast(members, None, ServerEvent::UpdateActiveUsers(count))
        .await;
}
