/// Document store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocStoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document unavailable: {0}")]
    Unavailable(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
