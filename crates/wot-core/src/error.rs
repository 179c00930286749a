/// Errors shared across the web-of-trust crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid trust level: {0}")]
    InvalidTrustLevel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
