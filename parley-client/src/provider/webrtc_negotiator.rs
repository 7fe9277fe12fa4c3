use crate::provider::{
    ConnectionEvent, ConnectivityState, LocalStream, MediaKind, NegotiationProvider,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parley_core::{ConnectionId, IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Negotiation provider backed by native `RTCPeerConnection`s.
pub struct WebRtcNegotiator {
    api: API,
    connections: DashMap<ConnectionId, Arc<RTCPeerConnection>>,
}

impl WebRtcNegotiator {
    pub fn new() -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self {
            api,
            connections: DashMap::new(),
        })
    }

    fn connection(&self, remote: &ConnectionId) -> Result<Arc<RTCPeerConnection>> {
        self.connections
            .get(remote)
            .map(|pc| Arc::clone(pc.value()))
            .with_context(|| format!("No connection open for {remote}"))
    }
}

fn connectivity_from(state: RTCIceConnectionState) -> ConnectivityState {
    match state {
        RTCIceConnectionState::Checking => ConnectivityState::Checking,
        RTCIceConnectionState::Connected => ConnectivityState::Connected,
        RTCIceConnectionState::Completed => ConnectivityState::Completed,
        RTCIceConnectionState::Disconnected => ConnectivityState::Disconnected,
        RTCIceConnectionState::Failed => ConnectivityState::Failed,
        RTCIceConnectionState::Closed => ConnectivityState::Closed,
        _ => ConnectivityState::New,
    }
}

#[async_trait]
impl NegotiationProvider for WebRtcNegotiator {
    async fn open(
        &self,
        remote: &ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<()> {
        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            self.api
                .new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let ice_tx = events.clone();
        let uid_ice = remote.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let candidate = match c {
                    Some(c) => match c.to_json() {
                        Ok(init) => Some(IceCandidate {
                            label: init.sdp_mline_index,
                            candidate: init.candidate,
                        }),
                        Err(e) => {
                            warn!("Unserializable ICE candidate for {}: {}", uid, e);
                            return;
                        }
                    },
                    None => None,
                };
                let _ = tx.send(ConnectionEvent::CandidateDiscovered {
                    remote: uid,
                    candidate,
                });
            })
        }));

        let state_tx = events.clone();
        let uid_state = remote.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    debug!("ICE connection state for {}: {}", uid, s);
                    let _ = tx.send(ConnectionEvent::StateChanged {
                        remote: uid,
                        state: connectivity_from(s),
                    });
                })
            },
        ));

        let track_tx = events;
        let uid_track = remote.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let uid = uid_track.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Video => MediaKind::Video,
                        _ => MediaKind::Audio,
                    };
                    let _ = tx.send(ConnectionEvent::TrackReceived {
                        remote: uid,
                        track_id: track.id(),
                        kind,
                    });
                })
            },
        ));

        if let Some(previous) = self.connections.insert(remote.clone(), peer_connection) {
            let _ = previous.close().await;
        }
        info!("Opened peer connection for {}", remote);
        Ok(())
    }

    async fn attach_local_tracks(
        &self,
        remote: &ConnectionId,
        stream: &LocalStream,
    ) -> Result<()> {
        let peer_connection = self.connection(remote)?;

        for track in &stream.tracks {
            let mime_type = match track.kind {
                MediaKind::Audio => MIME_TYPE_OPUS,
                MediaKind::Video => MIME_TYPE_VP8,
            };
            let local = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: mime_type.to_owned(),
                    ..Default::default()
                },
                track.id.clone(),
                stream.id.clone(),
            ));

            peer_connection
                .add_track(local as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .with_context(|| format!("Failed to add track {}", track.id))?;
        }

        debug!("Attached {} local tracks for {}", stream.tracks.len(), remote);
        Ok(())
    }

    async fn create_offer(&self, remote: &ConnectionId) -> Result<SessionDescription> {
        let peer_connection = self.connection(remote)?;

        let offer = peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;
        peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self, remote: &ConnectionId) -> Result<SessionDescription> {
        let peer_connection = self.connection(remote)?;

        let answer = peer_connection
            .create_answer(None)
            .await
            .context("Failed to create answer")?;
        peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn apply_remote_description(
        &self,
        remote: &ConnectionId,
        desc: &SessionDescription,
    ) -> Result<()> {
        let peer_connection = self.connection(remote)?;

        let description = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone())?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone())?,
        };
        peer_connection
            .set_remote_description(description)
            .await
            .context("Failed to set remote description")?;
        Ok(())
    }

    async fn add_ice_candidate(
        &self,
        remote: &ConnectionId,
        candidate: &IceCandidate,
    ) -> Result<()> {
        let peer_connection = self.connection(remote)?;

        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mline_index: candidate.label,
            ..Default::default()
        };
        peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self, remote: &ConnectionId) -> Result<()> {
        let Some((_, peer_connection)) = self.connections.remove(remote) else {
            return Ok(());
        };
        peer_connection
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}
