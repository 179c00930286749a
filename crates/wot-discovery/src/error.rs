/// Discovery engine errors.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("document load timed out: {0}")]
    Timeout(String),

    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("document belongs to {found}, expected {expected}")]
    ForeignDocument { expected: String, found: String },

    #[error("invalid discovery payload: {0}")]
    InvalidPayload(String),

    #[error("document store error: {0}")]
    DocStore(#[from] wot_docstore::DocStoreError),

    #[error("attestation error: {0}")]
    Attestation(#[from] wot_attestation::AttestationError),
}
