use crate::error::JoinError;
use crate::provider::LocalStream;
use crate::session::{PeerAction, PeerEvent, PeerSession};
use parley_core::utils::default_ice_servers;
use parley_core::{
    ConnectionId, IceCandidate, IceServerConfig, RoomId, SdpKind, SessionDescription,
    SignalMessage,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What the local user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Selection,
    InCall,
}

/// Effects of a context transition. Peer actions are tagged with their remote.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    AcquireLocalMedia,
    Send(SignalMessage),
    Peer {
        remote: ConnectionId,
        action: PeerAction,
    },
}

/// Per-client state: who we are, which room we are in, our media, and one
/// [`PeerSession`] per remote.
#[derive(Debug)]
pub struct SessionContext {
    identity_hint: String,
    local_id: Option<ConnectionId>,
    room_id: Option<RoomId>,
    local_stream: Option<LocalStream>,
    peers: HashMap<ConnectionId, PeerSession>,
    view: ViewState,
    ice_servers: Vec<IceServerConfig>,
}

impl SessionContext {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            identity_hint: Uuid::new_v4().to_string(),
            local_id: None,
            room_id: None,
            local_stream: None,
            peers: HashMap::new(),
            view: ViewState::Selection,
            ice_servers,
        }
    }

    /// Validates the name and builds the `join` request.
    ///
    /// Nothing changes on error.
    pub fn join_room(&mut self, room_name: &str) -> Result<SignalMessage, JoinError> {
        if room_name.is_empty() {
            return Err(JoinError::EmptyRoomName);
        }

        self.view = ViewState::InCall;
        Ok(SignalMessage::Join {
            room: RoomId::from(room_name),
            peer_uuid: Some(self.identity_hint.clone()),
        })
    }

    pub fn on_signal(&mut self, message: SignalMessage) -> Vec<SessionAction> {
        match message {
            SignalMessage::IceConfig { ice_servers } => {
                if ice_servers.is_empty() {
                    debug!("Relay advertised no ICE servers; keeping {:?}", self.ice_servers);
                } else {
                    debug!("Using {} ICE server entries from relay", ice_servers.len());
                    self.ice_servers = ice_servers;
                }
                Vec::new()
            }

            SignalMessage::RoomCreated { room_id, peer_id } => {
                info!("Created room '{}' as {}", room_id, peer_id);
                self.enter_room(room_id, peer_id);
                vec![SessionAction::AcquireLocalMedia]
            }

            SignalMessage::RoomJoined { room_id, peer_id } => {
                info!("Joined room '{}' as {}", room_id, peer_id);
                self.enter_room(room_id.clone(), peer_id.clone());
                vec![
                    SessionAction::AcquireLocalMedia,
                    SessionAction::Send(SignalMessage::StartCall {
                        room_id,
                        sender_id: peer_id,
                    }),
                ]
            }

            SignalMessage::StartCall { sender_id, .. } => {
                self.dispatch_new(sender_id, PeerEvent::StartCall)
            }

            SignalMessage::WebrtcOffer {
                sdp,
                sender_id,
                receiver_id,
                ..
            } => {
                if !self.is_addressed_to_us(&receiver_id) {
                    return Vec::new();
                }
                match read_description(&sdp, SdpKind::Offer, &sender_id) {
                    Some(offer) => self.dispatch_new(sender_id, PeerEvent::RemoteOffer(offer)),
                    None => Vec::new(),
                }
            }

            SignalMessage::WebrtcAnswer {
                sdp,
                sender_id,
                receiver_id,
                ..
            } => {
                if !self.is_addressed_to_us(&receiver_id) {
                    return Vec::new();
                }
                match read_description(&sdp, SdpKind::Answer, &sender_id) {
                    Some(answer) => self.dispatch_known(sender_id, PeerEvent::RemoteAnswer(answer)),
                    None => Vec::new(),
                }
            }

            SignalMessage::WebrtcIceCandidate {
                sender_id,
                receiver_id,
                label,
                candidate,
                ..
            } => {
                if !self.is_addressed_to_us(&receiver_id) {
                    return Vec::new();
                }
                let candidate = IceCandidate { label, candidate };
                self.dispatch_known(sender_id, PeerEvent::RemoteCandidate(candidate))
            }

            SignalMessage::Join { .. } => {
                warn!("Received client-only 'join' from the relay");
                Vec::new()
            }
        }
    }

    /// Feeds a connection callback or provider result into the remote's session.
    pub fn on_peer_event(&mut self, remote: &ConnectionId, event: PeerEvent) -> Vec<SessionAction> {
        match self.peers.get_mut(remote) {
            Some(peer) => wrap(remote, peer.handle(event)),
            None => {
                debug!("No session for {}; dropping {:?}", remote, event);
                Vec::new()
            }
        }
    }

    pub fn set_local_stream(&mut self, stream: LocalStream) {
        self.local_stream = Some(stream);
    }

    /// Drops the room, identity, media and every peer session. Returns the
    /// remotes whose connections the caller must close.
    pub fn leave(&mut self) -> Vec<ConnectionId> {
        if let Some(room) = self.room_id.take() {
            info!("Leaving room '{}'", room);
        }
        self.local_id = None;
        self.local_stream = None;
        self.view = ViewState::Selection;
        self.peers.drain().map(|(remote, _)| remote).collect()
    }

    pub fn local_id(&self) -> Option<&ConnectionId> {
        self.local_id.as_ref()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn identity_hint(&self) -> &str {
        &self.identity_hint
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        self.local_stream.as_ref()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn peer(&self, remote: &ConnectionId) -> Option<&PeerSession> {
        self.peers.get(remote)
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    fn enter_room(&mut self, room_id: RoomId, peer_id: ConnectionId) {
        self.room_id = Some(room_id);
        self.local_id = Some(peer_id);
        self.view = ViewState::InCall;
    }

    fn is_addressed_to_us(&self, receiver_id: &ConnectionId) -> bool {
        let ours = self.local_id.as_ref() == Some(receiver_id);
        if !ours {
            warn!("Dropping signal addressed to {}", receiver_id);
        }
        ours
    }

    /// Routes to the remote's session, creating one if this is the first we hear of it.
    fn dispatch_new(&mut self, remote: ConnectionId, event: PeerEvent) -> Vec<SessionAction> {
        let (Some(local_id), Some(room_id)) = (&self.local_id, &self.room_id) else {
            warn!("Not in a room yet; ignoring {:?} from {}", event, remote);
            return Vec::new();
        };
        if &remote == local_id {
            debug!("Ignoring our own {:?}", event);
            return Vec::new();
        }

        let peer = self.peers.entry(remote.clone()).or_insert_with(|| {
            info!("New peer session with {}", remote);
            PeerSession::new(remote.clone(), local_id.clone(), room_id.clone())
        });
        wrap(&remote, peer.handle(event))
    }

    fn dispatch_known(&mut self, remote: ConnectionId, event: PeerEvent) -> Vec<SessionAction> {
        match self.peers.get_mut(&remote) {
            Some(peer) => wrap(&remote, peer.handle(event)),
            None => {
                warn!("Signal from unknown peer {}: {:?}", remote, event);
                Vec::new()
            }
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(default_ice_servers())
    }
}

/// Parses a relayed description. Anything unusable is a negotiation failure
/// for that remote and is only logged.
fn read_description(
    sdp: &Value,
    expected: SdpKind,
    from: &ConnectionId,
) -> Option<SessionDescription> {
    match SessionDescription::from_value(sdp) {
        Ok(desc) if desc.kind == expected => Some(desc),
        Ok(desc) => {
            error!("Expected {} from {}, got {}", expected, from, desc.kind);
            None
        }
        Err(e) => {
            error!("Unusable description from {}: {}", from, e);
            None
        }
    }
}

fn wrap(remote: &ConnectionId, actions: Vec<PeerAction>) -> Vec<SessionAction> {
    actions
        .into_iter()
        .map(|action| SessionAction::Peer {
            remote: remote.clone(),
            action,
        })
        .collect()
}
