use crate::provider::{ConnectivityState, MediaKind};
use parley_core::{
    ConnectionId, IceCandidate, RoomId, SdpKind, SessionDescription, SignalMessage,
};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerPhase {
    Idle,
    Negotiating(NegotiationRole),
    Connected,
    /// Terminal. The record is kept but ignores every further event.
    Disconnected,
}

impl fmt::Display for PeerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerPhase::Idle => f.write_str("idle"),
            PeerPhase::Negotiating(NegotiationRole::Offerer) => f.write_str("negotiating(offerer)"),
            PeerPhase::Negotiating(NegotiationRole::Answerer) => {
                f.write_str("negotiating(answerer)")
            }
            PeerPhase::Connected => f.write_str("connected"),
            PeerPhase::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Inputs to a peer session: relayed signals from the remote, and results or
/// callbacks from the local connection object.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    /// The remote announced itself with `start_call`; we make the offer.
    StartCall,
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
    /// Our offer or answer has been synthesized and set locally.
    LocalDescriptionReady(SessionDescription),
    /// The connection accepted the remote description of this kind.
    RemoteDescriptionApplied(SdpKind),
    /// `None` marks end-of-candidates.
    LocalCandidate(Option<IceCandidate>),
    RemoteTrack { track_id: String, kind: MediaKind },
    ConnectivityChanged(ConnectivityState),
}

/// Side effects requested by a transition, executed in order by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerAction {
    /// Create the connection object and register its track, candidate and
    /// state callbacks.
    OpenConnection,
    AttachLocalTracks,
    ApplyRemoteDescription(SessionDescription),
    CreateOffer,
    CreateAnswer,
    AddIceCandidate(IceCandidate),
    Send(SignalMessage),
    ShowRemote { track_id: String },
    RemoveRemote,
}

/// Negotiation state one client keeps for one remote peer.
#[derive(Debug, Clone)]
pub struct PeerSession {
    remote_id: ConnectionId,
    local_id: ConnectionId,
    room_id: RoomId,
    phase: PeerPhase,
    description_sent: bool,
    answer_received: bool,
    view_shown: bool,
}

impl PeerSession {
    pub fn new(remote_id: ConnectionId, local_id: ConnectionId, room_id: RoomId) -> Self {
        Self {
            remote_id,
            local_id,
            room_id,
            phase: PeerPhase::Idle,
            description_sent: false,
            answer_received: false,
            view_shown: false,
        }
    }

    pub fn remote_id(&self) -> &ConnectionId {
        &self.remote_id
    }

    pub fn phase(&self) -> PeerPhase {
        self.phase
    }

    pub fn role(&self) -> Option<NegotiationRole> {
        match self.phase {
            PeerPhase::Negotiating(role) => Some(role),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == PeerPhase::Disconnected
    }

    /// Pure transition: updates the phase and returns the effects to run.
    pub fn handle(&mut self, event: PeerEvent) -> Vec<PeerAction> {
        if self.is_terminal() {
            debug!("Peer {} is disconnected; ignoring {:?}", self.remote_id, event);
            return Vec::new();
        }

        match (self.phase, event) {
            (PeerPhase::Idle, PeerEvent::StartCall) => {
                self.phase = PeerPhase::Negotiating(NegotiationRole::Offerer);
                vec![
                    PeerAction::OpenConnection,
                    PeerAction::AttachLocalTracks,
                    PeerAction::CreateOffer,
                ]
            }

            (PeerPhase::Idle, PeerEvent::RemoteOffer(offer)) => {
                self.phase = PeerPhase::Negotiating(NegotiationRole::Answerer);
                vec![
                    PeerAction::OpenConnection,
                    PeerAction::ApplyRemoteDescription(offer),
                    PeerAction::AttachLocalTracks,
                    PeerAction::CreateAnswer,
                ]
            }

            (PeerPhase::Negotiating(role), PeerEvent::LocalDescriptionReady(desc)) => {
                self.on_local_description(role, desc)
            }

            (PeerPhase::Negotiating(NegotiationRole::Offerer), PeerEvent::RemoteAnswer(answer)) => {
                if self.answer_received {
                    warn!("Ignoring repeated answer from {}", self.remote_id);
                    return Vec::new();
                }
                self.answer_received = true;
                vec![PeerAction::ApplyRemoteDescription(answer)]
            }

            // Connected only once the answer is actually in place.
            (
                PeerPhase::Negotiating(NegotiationRole::Offerer),
                PeerEvent::RemoteDescriptionApplied(SdpKind::Answer),
            ) => {
                self.phase = PeerPhase::Connected;
                Vec::new()
            }

            (
                PeerPhase::Negotiating(NegotiationRole::Answerer) | PeerPhase::Connected,
                PeerEvent::RemoteDescriptionApplied(SdpKind::Offer),
            ) => Vec::new(),

            (
                PeerPhase::Negotiating(_) | PeerPhase::Connected,
                PeerEvent::RemoteCandidate(candidate),
            ) => {
                if candidate.is_end_of_candidates() {
                    return Vec::new();
                }
                vec![PeerAction::AddIceCandidate(candidate)]
            }

            (_, PeerEvent::LocalCandidate(candidate)) => match candidate {
                Some(candidate) if !candidate.is_end_of_candidates() => {
                    vec![PeerAction::Send(SignalMessage::ice_candidate(
                        self.local_id.clone(),
                        self.remote_id.clone(),
                        self.room_id.clone(),
                        candidate,
                    ))]
                }
                _ => Vec::new(),
            },

            (_, PeerEvent::RemoteTrack { track_id, kind }) => {
                if kind != MediaKind::Video || self.view_shown {
                    return Vec::new();
                }
                self.view_shown = true;
                vec![PeerAction::ShowRemote { track_id }]
            }

            (_, PeerEvent::ConnectivityChanged(state)) => {
                if !state.is_terminal() {
                    debug!("Connection with {} is {}", self.remote_id, state);
                    return Vec::new();
                }
                self.phase = PeerPhase::Disconnected;
                self.view_shown = false;
                vec![PeerAction::RemoveRemote]
            }

            (phase, event) => {
                warn!(
                    "Peer {} in phase {} ignores {:?}",
                    self.remote_id, phase, event
                );
                Vec::new()
            }
        }
    }

    fn on_local_description(
        &mut self,
        role: NegotiationRole,
        desc: SessionDescription,
    ) -> Vec<PeerAction> {
        if self.description_sent {
            warn!("Already sent a description to {}", self.remote_id);
            return Vec::new();
        }

        let message = match (role, desc.kind) {
            (NegotiationRole::Offerer, SdpKind::Offer) => SignalMessage::WebrtcOffer {
                sdp: desc.to_value(),
                sender_id: self.local_id.clone(),
                room_id: self.room_id.clone(),
                receiver_id: self.remote_id.clone(),
            },
            (NegotiationRole::Answerer, SdpKind::Answer) => {
                // The answerer's half of the exchange is complete once the answer leaves.
                self.phase = PeerPhase::Connected;
                SignalMessage::WebrtcAnswer {
                    sdp: desc.to_value(),
                    sender_id: self.local_id.clone(),
                    room_id: self.room_id.clone(),
                    receiver_id: self.remote_id.clone(),
                }
            }
            (role, kind) => {
                warn!(
                    "Refusing to send {} to {} while acting as {:?}",
                    kind, self.remote_id, role
                );
                return Vec::new();
            }
        };

        self.description_sent = true;
        vec![PeerAction::Send(message)]
    }
}
