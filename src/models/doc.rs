use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a shared document. Used both as the session key and the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Build a document id from untrusted client input.
    ///
    /// Blank ids are treated the same as a missing id. Anything else is kept verbatim.
    pub fn parse(raw: Option<String>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty()).map(DocumentId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId(value.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one live client channel, assigned when the socket is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        ConnectionId(uuid::Uuid::new_v4().to_string())
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        ConnectionId(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest full serialized content of a document, e.g. a rich-text delta.
///
/// The relay never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub Value);

impl Snapshot {
    /// Content of a document that has never been saved.
    pub fn empty() -> Self {
        Snapshot(Value::String(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_missing_and_blank_ids() {
        assert_eq!(DocumentId::parse(None), None);
        assert_eq!(DocumentId::parse(Some("   ".to_string())), None);
        assert_eq!(DocumentId::parse(Some(String::new())), None);
        assert_eq!(
            DocumentId::parse(Some("doc1".to_string())),
            Some(DocumentId::from("doc1"))
        );
    }

    #[test]
    fn parse_keeps_padded_ids_verbatim() {
        let padded = DocumentId::parse(Some(" doc1 ".to_string())).unwrap();
        assert_eq!(padded.as_str(), " doc1 ");
        assert_ne!(padded, DocumentId::from("doc1"));
    }

    #[test]
    fn generated_connection_ids_are_unique() {
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }
}
