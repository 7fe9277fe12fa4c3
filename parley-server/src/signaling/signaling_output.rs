use async_trait::async_trait;
use parley_core::{ConnectionId, SignalMessage};

/// Implemented by whatever owns the client sockets, so the relay can reach a
/// connection without knowing how it is transported.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a message to one connection. Unknown connections are dropped.
    async fn deliver(&self, connection_id: &ConnectionId, message: SignalMessage);
}
