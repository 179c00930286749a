/// Attestation store errors.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("cannot attest trust in oneself: {0}")]
    SelfTrust(String),

    #[error("document belongs to {found}, expected {expected}")]
    DocumentOwnerMismatch { expected: String, found: String },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("no attestation received from {0}")]
    NotReceived(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] wot_crypto::CryptoError),

    #[error("document store error: {0}")]
    DocStore(#[from] wot_docstore::DocStoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
