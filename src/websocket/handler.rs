use std::sync::Arc;
use std::time::Duration;
use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, State},
    response::Response,
};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::models::{ClientEvent, ConnectionId};
use crate::session::SessionError;
use crate::websocket::connection::Connection;
use crate::websocket::msg_changes_handler::handle_send_changes;
use crate::websocket::msg_cursor_handler::handle_send_cursor;
use crate::websocket::msg_get_document_handler::handle_get_document;
use crate::websocket::msg_leave_handler::leave_session;
use crate::websocket::msg_save_handler::handle_save_document;

/// How long the writer may keep flushing queued events after the reader stopped.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let conn = Connection::new();
    let conn_id = conn.id.clone();
    info!("WebSocket connection established with connection_id: {}", conn_id);

    let (mut sender, receiver) = socket.split();
    let mut outbound = app_state.outbox.register(&conn_id).await;

    // Writer: drains this connection's queue in order until the outbox drops it
    let writer_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize '{}' for {}: {}", event.name(), writer_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                debug!("Socket of {} closed while sending", writer_id);
                return;
            }
        }
        let _ = sender.close().await;
    });

    // Reader: handles one client event at a time, only stops between events
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut recv_task = tokio::spawn(read_events(receiver, stop_rx, app_state.clone(), conn));

    let writer_done = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => {
            let _ = stop_tx.send(true);
            let _ = (&mut recv_task).await;
            true
        }
    };

    handle_disconnect(&app_state, &conn_id).await;

    if !writer_done && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task).await.is_err() {
        warn!("Writer of {} did not drain in time", conn_id);
        send_task.abort();
    }
    info!("WebSocket connection terminated: {}", conn_id);
}

/// Read frames until the socket ends, a handler fails, or `stop` fires.
///
/// `stop` is only observed while waiting for the next frame, so a handler that already
/// started always runs to completion.
pub async fn read_events<S>(
    mut receiver: S,
    mut stop: watch::Receiver<bool>,
    state: Arc<AppState>,
    mut conn: Connection,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = receiver.next() => frame,
            _ = stop.changed() => {
                debug!("Reader of {} stopped", conn.id);
                break;
            }
        };
        let Some(frame) = frame else {
            break;
        };

        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket error on {}: {}", conn.id, e);
                break;
            }
        };

        let event: ClientEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to parse message from {}: {}", conn.id, e);
                continue;
            }
        };

        if let Err(e) = handle_client_event(&state, &mut conn, event).await {
            error!("Closing connection {}: {}", conn.id, e);
            break;
        }
    }
}

/// Dispatch one client event. An error means the connection must be closed.
pub async fn handle_client_event(
    state: &AppState,
    conn: &mut Connection,
    event: ClientEvent,
) -> Result<(), SessionError> {
    match event {
        ClientEvent::GetDocument(raw_id) => handle_get_document(state, conn, raw_id).await?,
        ClientEvent::SendChanges(operation) => handle_send_changes(state, conn, operation).await,
        ClientEvent::SendCursor(report) => handle_send_cursor(state, conn, report).await,
        ClientEvent::SaveDocument(content) => handle_save_document(state, conn, content).await,
        ClientEvent::LeaveDocument => {
            leave_session(state, conn).await;
        }
    }
    Ok(())
}

/// Clean up after a socket went away. Repeated calls are no-ops.
pub async fn handle_disconnect(state: &AppState, conn_id: &ConnectionId) {
    let mut conn = Connection::with_id(conn_id.clone());
    leave_session(state, &mut conn).await;
    state.outbox.unregister(conn_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CursorReport, CursorUpdate, DocumentId, ServerEvent, Snapshot};
    use crate::test_helpers::{memory_state, GatedStore, UnreachableStore};
    use futures_util::stream;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Client {
        conn: Connection,
        rx: UnboundedReceiver<ServerEvent>,
    }

    impl Client {
        async fn connect(state: &AppState, id: &str) -> Self {
            let conn = Connection::with_id(ConnectionId::from(id));
            let rx = state.outbox.register(&conn.id).await;
            Self { conn, rx }
        }

        async fn send(&mut self, state: &AppState, event: ClientEvent) -> Result<(), SessionError> {
            handle_client_event(state, &mut self.conn, event).await
        }

        async fn join(&mut self, state: &AppState, doc: &str) {
            self.send(state, ClientEvent::GetDocument(Some(doc.to_string())))
                .await
                .unwrap();
        }

        fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    #[tokio::test]
    async fn join_delivers_snapshot_then_presence() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        a.join(&state, "doc1").await;

        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::LoadDocument(Snapshot::empty()),
                ServerEvent::UpdateActiveUsers(1),
            ]
        );
    }

    #[tokio::test]
    async fn join_without_document_id_does_nothing() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        a.send(&state, ClientEvent::GetDocument(None)).await.unwrap();

        assert!(a.drain().is_empty());
        assert_eq!(state.registry.session_count().await, 0);
        assert!(a.conn.document().is_none());
    }

    #[tokio::test]
    async fn edit_and_disconnect_scenario() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, "doc1").await;
        a.drain();
        b.drain();

        a.send(&state, ClientEvent::SendChanges(json!({"insert": "hi"}))).await.unwrap();
        assert_eq!(b.drain(), vec![ServerEvent::ReceiveChanges(json!({"insert": "hi"}))]);
        assert!(a.drain().is_empty());

        handle_disconnect(&state, &b.conn.id).await;
        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::UserDisconnected(ConnectionId::from("b")),
                ServerEvent::UpdateActiveUsers(1),
            ]
        );
        assert!(!state
            .registry
            .members_of(&DocumentId::from("doc1"))
            .await
            .contains(&ConnectionId::from("b")));
    }

    #[tokio::test]
    async fn repeated_disconnect_is_silent() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, "doc1").await;
        a.drain();

        handle_disconnect(&state, &b.conn.id).await;
        handle_disconnect(&state, &b.conn.id).await;
        handle_disconnect(&state, &ConnectionId::from("never-joined")).await;

        assert_eq!(a.drain().len(), 2);
    }

    #[tokio::test]
    async fn saved_content_is_loaded_by_the_next_joiner() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        a.join(&state, "doc1").await;
        a.send(&state, ClientEvent::SaveDocument(json!("hello"))).await.unwrap();
        handle_disconnect(&state, &a.conn.id).await;

        let mut c = Client::connect(&state, "c").await;
        c.join(&state, "doc1").await;
        assert_eq!(c.drain()[0], ServerEvent::LoadDocument(Snapshot(json!("hello"))));
    }

    #[tokio::test]
    async fn cursor_is_relayed_with_sender_identity() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, "doc1").await;
        a.drain();
        b.drain();

        let report = CursorReport {
            range: Some(json!({"index": 1, "length": 0})),
            display_name: "User 7".to_string(),
        };
        a.send(&state, ClientEvent::SendCursor(report)).await.unwrap();

        assert_eq!(
            b.drain(),
            vec![ServerEvent::UpdateCursor(CursorUpdate {
                connection_id: ConnectionId::from("a"),
                display_name: "User 7".to_string(),
                range: Some(json!({"index": 1, "length": 0})),
            })]
        );
        assert!(a.drain().is_empty());
    }

    #[tokio::test]
    async fn unbound_connection_relays_nothing() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        b.join(&state, "doc1").await;
        b.drain();

        a.send(&state, ClientEvent::SendChanges(json!({"insert": "x"}))).await.unwrap();
        a.send(&state, ClientEvent::SaveDocument(json!("overwrite"))).await.unwrap();

        assert!(b.drain().is_empty());
        let stored = state.lifecycle.store().load(&DocumentId::from("doc1")).await.unwrap();
        assert_eq!(stored, Snapshot::empty());
    }

    #[tokio::test]
    async fn switching_documents_leaves_the_old_session() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, "doc1").await;
        a.drain();
        b.drain();

        a.join(&state, "doc2").await;

        assert_eq!(
            b.drain(),
            vec![
                ServerEvent::UserDisconnected(ConnectionId::from("a")),
                ServerEvent::UpdateActiveUsers(1),
            ]
        );
        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::LoadDocument(Snapshot::empty()),
                ServerEvent::UpdateActiveUsers(1),
            ]
        );
        assert_eq!(state.registry.count_of(&DocumentId::from("doc1")).await, 1);
        assert_eq!(state.registry.count_of(&DocumentId::from("doc2")).await, 1);
    }

    #[tokio::test]
    async fn explicit_leave_then_disconnect_broadcasts_once() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, "doc1").await;
        a.drain();

        b.send(&state, ClientEvent::LeaveDocument).await.unwrap();
        handle_disconnect(&state, &b.conn.id).await;

        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::UserDisconnected(ConnectionId::from("b")),
                ServerEvent::UpdateActiveUsers(1),
            ]
        );
    }

    #[tokio::test]
    async fn store_outage_refuses_the_join() {
        let state = AppState::new(std::sync::Arc::new(UnreachableStore));
        let mut a = Client::connect(&state, "a").await;

        let res = a.send(&state, ClientEvent::GetDocument(Some("doc1".to_string()))).await;

        assert!(matches!(res, Err(SessionError::JoinFailed { .. })));
        assert!(matches!(a.drain().as_slice(), [ServerEvent::Error(_)]));
        assert_eq!(state.registry.count_of(&DocumentId::from("doc1")).await, 0);
        assert!(a.conn.document().is_none());
    }

    #[tokio::test]
    async fn padded_document_ids_are_separate_sessions() {
        let state = memory_state();
        let mut a = Client::connect(&state, "a").await;
        let mut b = Client::connect(&state, "b").await;
        a.join(&state, "doc1").await;
        b.join(&state, " doc1").await;
        a.drain();
        b.drain();

        a.send(&state, ClientEvent::SendChanges(json!({"insert": "x"}))).await.unwrap();

        assert!(b.drain().is_empty());
        assert_eq!(state.registry.count_of(&DocumentId::from("doc1")).await, 1);
        assert_eq!(state.registry.count_of(&DocumentId::from(" doc1")).await, 1);
    }

    #[tokio::test]
    async fn stopping_the_reader_lets_the_current_event_finish() {
        let store = Arc::new(GatedStore::new());
        let state = Arc::new(AppState::new(store.clone()));
        let conn = Connection::with_id(ConnectionId::from("a"));
        let mut rx = state.outbox.register(&conn.id).await;

        let join = json!({"event": "get-document", "data": "doc1"}).to_string();
        let frames = stream::iter(vec![Ok(Message::Text(join))])
            .chain(stream::pending::<Result<Message, axum::Error>>());
        let (stop_tx, stop_rx) = watch::channel(false);
        let reader = tokio::spawn(read_events(frames, stop_rx, state.clone(), conn));

        store.wait_entered().await;
        stop_tx.send(true).unwrap();
        store.open();
        reader.await.unwrap();

        let doc = DocumentId::from("doc1");
        assert_eq!(state.registry.count_of(&doc).await, 1);
        assert_eq!(rx.recv().await, Some(ServerEvent::LoadDocument(Snapshot::empty())));
        assert_eq!(rx.recv().await, Some(ServerEvent::UpdateActiveUsers(1)));

        handle_disconnect(&state, &ConnectionId::from("a")).await;
        assert_eq!(state.registry.count_of(&doc).await, 0);
        assert_eq!(state.registry.bound_count().await, 0);
    }
}
