use crate::db::StoreError;
use crate::models::DocumentId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not open document '{doc}': {source}")]
    JoinFailed {
        doc: DocumentId,
        #[source]
        source: StoreError,
    },
}
