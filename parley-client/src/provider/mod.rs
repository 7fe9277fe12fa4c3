//! Narrow capability contracts the session core needs from the outside world:
//! a local stream, a negotiating connection per remote, and somewhere to show
//! remote views.

mod static_media;
mod tracing_surface;
mod webrtc_negotiator;

pub use static_media::StaticMedia;
pub use tracing_surface::TracingSurface;
pub use webrtc_negotiator::WebRtcNegotiator;

use anyhow::Result;
use async_trait::async_trait;
use parley_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use std::fmt;
use tokio::sync::mpsc;

use crate::session::PeerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: MediaKind,
}

/// Handle to the captured local media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStream {
    pub id: String,
    pub tracks: Vec<LocalTrack>,
}

/// ICE connectivity state as reported by the connection object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectivityState {
    /// States that mean the remote is gone.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectivityState::Failed | ConnectivityState::Closed | ConnectivityState::Disconnected
        )
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectivityState::New => "new",
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Completed => "completed",
            ConnectivityState::Disconnected => "disconnected",
            ConnectivityState::Failed => "failed",
            ConnectivityState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Callback output of a connection object, tagged with the remote it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    CandidateDiscovered {
        remote: ConnectionId,
        candidate: Option<IceCandidate>,
    },
    StateChanged {
        remote: ConnectionId,
        state: ConnectivityState,
    },
    TrackReceived {
        remote: ConnectionId,
        track_id: String,
        kind: MediaKind,
    },
}

impl ConnectionEvent {
    pub fn remote(&self) -> &ConnectionId {
        match self {
            ConnectionEvent::CandidateDiscovered { remote, .. }
            | ConnectionEvent::StateChanged { remote, .. }
            | ConnectionEvent::TrackReceived { remote, .. } => remote,
        }
    }

    pub fn into_peer_event(self) -> PeerEvent {
        match self {
            ConnectionEvent::CandidateDiscovered { candidate, .. } => {
                PeerEvent::LocalCandidate(candidate)
            }
            ConnectionEvent::StateChanged { state, .. } => PeerEvent::ConnectivityChanged(state),
            ConnectionEvent::TrackReceived { track_id, kind, .. } => {
                PeerEvent::RemoteTrack { track_id, kind }
            }
        }
    }
}

#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn acquire(&self) -> Result<LocalStream>;
}

/// One connection object per remote peer, addressed by the remote's identity.
#[async_trait]
pub trait NegotiationProvider: Send + Sync {
    /// Create the connection and route its callbacks into `events`.
    async fn open(
        &self,
        remote: &ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<()>;

    async fn attach_local_tracks(&self, remote: &ConnectionId, stream: &LocalStream)
    -> Result<()>;

    /// Synthesize an offer and set it as the local description.
    async fn create_offer(&self, remote: &ConnectionId) -> Result<SessionDescription>;

    /// Synthesize an answer and set it as the local description.
    async fn create_answer(&self, remote: &ConnectionId) -> Result<SessionDescription>;

    async fn apply_remote_description(
        &self,
        remote: &ConnectionId,
        desc: &SessionDescription,
    ) -> Result<()>;

    async fn add_ice_candidate(&self, remote: &ConnectionId, candidate: &IceCandidate)
    -> Result<()>;

    async fn close(&self, remote: &ConnectionId) -> Result<()>;
}

pub trait PresentationSurface: Send + Sync {
    fn show_local(&self, stream: &LocalStream);

    fn show_remote(&self, remote: &ConnectionId, track_id: &str);

    /// Must tolerate remotes that never had a view.
    fn remove_remote(&self, remote: &ConnectionId);
}
