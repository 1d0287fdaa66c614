use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::models::{ConnectionId, Snapshot};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorReport {
    pub range: Option<Value>,
    #[serde(default, alias = "username")]
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdate {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// `None` tells receivers to drop the indicator for this connection.
    pub range: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

/// Events sent by clients. Each frame is `{"event": ..., "data": ...}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "get-document")]
    GetDocument(Option<String>),
    #[serde(rename = "send-changes")]
    SendChanges(Value),
    #[serde(rename = "send-cursor")]
    SendCursor(CursorReport),
    #[serde(rename = "save-document")]
    SaveDocument(Value),
    #[serde(rename = "leave-document")]
    LeaveDocument,
}

/// Events sent by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "load-document")]
    LoadDocument(Snapshot),
    #[serde(rename = "update-active-users")]
    UpdateActiveUsers(usize),
    #[serde(rename = "receive-changes")]
    ReceiveChanges(Value),
    #[serde(rename = "update-cursor")]
    UpdateCursor(CursorUpdate),
    #[serde(rename = "user-disconnected")]
    UserDisconnected(ConnectionId),
    #[serde(rename = "error")]
    Error(ErrorMessage),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::LoadDocument(_) => "load-document",
            ServerEvent::UpdateActiveUsers(_) => "update-active-users",
            ServerEvent::ReceiveChanges(_) => "receive-changes",
            ServerEvent::UpdateCursor(_) => "update-cursor",
            ServerEvent::UserDisconnected(_) => "user-disconnected",
            ServerEvent::Error(_) => "error",
        }
    }
}
