/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("no private key available for {0}")]
    MissingPrivateKey(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] serde_json::Error),
}
