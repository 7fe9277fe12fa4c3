use thiserror::Error;

/// Reasons a room join is refused before anything reaches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("Please enter a room name")]
    EmptyRoomName,

    #[error("Not connected to the signaling server")]
    NotConnected,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Signaling transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}
