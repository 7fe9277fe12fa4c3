use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("malformed signal message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode signal message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unusable session description: {0}")]
    InvalidDescription(#[source] serde_json::Error),
}
