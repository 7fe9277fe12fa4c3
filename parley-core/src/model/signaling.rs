use crate::error::SignalError;
use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => f.write_str("offer"),
            SdpKind::Answer => f.write_str("answer"),
        }
    }
}

/// Session description as browsers serialize it: `{"type": "offer", "sdp": "v=0..."}`.
///
/// Only peers use this type. On the wire the description travels as an opaque
/// JSON value, so the relay forwards whatever the sender put there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }

    /// Reads a relayed payload. Unknown extra fields are ignored; types other
    /// than offer and answer are rejected.
    pub fn from_value(value: &Value) -> Result<Self, SignalError> {
        Self::deserialize(value).map_err(SignalError::InvalidDescription)
    }

    pub fn to_value(&self) -> Value {
        json!({"type": self.kind.to_string(), "sdp": self.sdp})
    }
}

/// Connectivity-path descriptor. `label` is the m-line index the candidate belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub label: Option<u16>,
    pub candidate: String,
}

impl IceCandidate {
    /// An empty candidate string marks end-of-candidates.
    pub fn is_end_of_candidates(&self) -> bool {
        self.candidate.trim().is_empty()
    }
}

/// Every message carried over the signaling socket, in both directions.
///
/// Encoded as `{"event": "<snake_case name>", "data": {<camelCase fields>}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum SignalMessage {
    /// Sent by the relay right after the socket opens.
    IceConfig { ice_servers: Vec<IceServerConfig> },

    Join {
        room: RoomId,
        /// Advisory only; the relay addresses peers by connection.
        #[serde(rename = "peerUUID", default, skip_serializing_if = "Option::is_none")]
        peer_uuid: Option<String>,
    },

    RoomCreated { room_id: RoomId, peer_id: ConnectionId },

    RoomJoined { room_id: RoomId, peer_id: ConnectionId },

    StartCall { room_id: RoomId, sender_id: ConnectionId },

    WebrtcOffer {
        sdp: Value,
        sender_id: ConnectionId,
        room_id: RoomId,
        receiver_id: ConnectionId,
    },

    WebrtcAnswer {
        sdp: Value,
        sender_id: ConnectionId,
        room_id: RoomId,
        receiver_id: ConnectionId,
    },

    WebrtcIceCandidate {
        sender_id: ConnectionId,
        receiver_id: ConnectionId,
        room_id: RoomId,
        #[serde(default)]
        label: Option<u16>,
        candidate: String,
    },
}

impl SignalMessage {
    pub fn from_json(text: &str) -> Result<Self, SignalError> {
        serde_json::from_str(text).map_err(SignalError::Decode)
    }

    pub fn to_json(&self) -> Result<String, SignalError> {
        serde_json::to_string(self).map_err(SignalError::Encode)
    }

    /// Wire event name, for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalMessage::IceConfig { .. } => "ice_config",
            SignalMessage::Join { .. } => "join",
            SignalMessage::RoomCreated { .. } => "room_created",
            SignalMessage::RoomJoined { .. } => "room_joined",
            SignalMessage::StartCall { .. } => "start_call",
            SignalMessage::WebrtcOffer { .. } => "webrtc_offer",
            SignalMessage::WebrtcAnswer { .. } => "webrtc_answer",
            SignalMessage::WebrtcIceCandidate { .. } => "webrtc_ice_candidate",
        }
    }

    /// The single addressee of a unicast signal, if this is one.
    pub fn receiver(&self) -> Option<&ConnectionId> {
        match self {
            SignalMessage::WebrtcOffer { receiver_id, .. }
            | SignalMessage::WebrtcAnswer { receiver_id, .. }
            | SignalMessage::WebrtcIceCandidate { receiver_id, .. } => Some(receiver_id),
            _ => None,
        }
    }

    pub fn ice_candidate(
        sender_id: ConnectionId,
        receiver_id: ConnectionId,
        room_id: RoomId,
        candidate: IceCandidate,
    ) -> Self {
        SignalMessage::WebrtcIceCandidate {
            sender_id,
            receiver_id,
            room_id,
            label: candidate.label,
            candidate: candidate.candidate,
        }
    }
}
