use parley_core::{ConnectionId, RoomId, SignalMessage};

/// Commands fed into the relay by the socket layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connection asked to enter a room.
    Join {
        connection_id: ConnectionId,
        room: RoomId,
        peer_uuid: Option<String>,
    },

    /// A peer-to-peer signal to forward (start_call, offer, answer, ICE).
    Signal {
        connection_id: ConnectionId,
        message: SignalMessage,
    },

    /// The WebSocket for this connection is gone.
    Disconnect { connection_id: ConnectionId },
}
