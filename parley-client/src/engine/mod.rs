//! Runs the session context against real providers: executes the actions each
//! transition returns and feeds provider results back in as events.

use crate::config::ClientConfig;
use crate::error::JoinError;
use crate::provider::{ConnectionEvent, MediaProvider, NegotiationProvider, PresentationSurface};
use crate::session::{PeerAction, PeerEvent, SessionAction, SessionContext};
use anyhow::Result;
use parley_core::{ConnectionId, SignalMessage};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct ClientEngine {
    context: SessionContext,
    media: Arc<dyn MediaProvider>,
    negotiator: Arc<dyn NegotiationProvider>,
    surface: Arc<dyn PresentationSurface>,
    outbound: mpsc::UnboundedSender<SignalMessage>,
    events_tx: mpsc::UnboundedSender<ConnectionEvent>,
    events_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
}

impl ClientEngine {
    pub fn new(
        config: &ClientConfig,
        media: Arc<dyn MediaProvider>,
        negotiator: Arc<dyn NegotiationProvider>,
        surface: Arc<dyn PresentationSurface>,
        outbound: mpsc::UnboundedSender<SignalMessage>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            context: SessionContext::new(config.ice_servers.clone()),
            media,
            negotiator,
            surface,
            outbound,
            events_tx,
            events_rx,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn join_room(&mut self, room_name: &str) -> Result<(), JoinError> {
        let request = self.context.join_room(room_name)?;
        self.outbound
            .send(request)
            .map_err(|_| JoinError::NotConnected)
    }

    pub async fn handle_signal(&mut self, message: SignalMessage) {
        debug!("Received {}", message.event_name());
        let actions = self.context.on_signal(message);
        self.execute(actions).await;
    }

    pub async fn handle_connection_event(&mut self, event: ConnectionEvent) {
        let remote = event.remote().clone();
        let actions = self.context.on_peer_event(&remote, event.into_peer_event());
        self.execute(actions).await;
    }

    /// Handles every connection event already queued, without waiting.
    pub async fn drain_connection_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_connection_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Closes every connection and returns to room selection. Nothing is sent.
    pub async fn leave(&mut self) {
        for remote in self.context.leave() {
            self.surface.remove_remote(&remote);
            if let Err(e) = self.negotiator.close(&remote).await {
                warn!("Failed to close connection with {}: {:#}", remote, e);
            }
        }
    }

    /// Event loop: relayed signals and connection callbacks, one at a time,
    /// until the signaling channel closes.
    pub async fn run(&mut self, mut signals: mpsc::UnboundedReceiver<SignalMessage>) {
        info!("Client event loop started");

        loop {
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(message) => self.handle_signal(message).await,
                    None => break,
                },
                Some(event) = self.events_rx.recv() => {
                    self.handle_connection_event(event).await;
                }
            }
        }

        info!("Signaling channel closed. Client event loop finished");
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) {
        let mut queue: VecDeque<SessionAction> = actions.into();
        let mut failed: HashSet<ConnectionId> = HashSet::new();

        while let Some(action) = queue.pop_front() {
            match action {
                SessionAction::AcquireLocalMedia => match self.media.acquire().await {
                    Ok(stream) => {
                        self.surface.show_local(&stream);
                        self.context.set_local_stream(stream);
                    }
                    Err(e) => error!("Failed to acquire local media: {:#}", e),
                },

                SessionAction::Send(message) => self.send(message),

                SessionAction::Peer { remote, action } => {
                    if failed.contains(&remote) {
                        debug!("Skipping {:?} for {} after earlier failure", action, remote);
                        continue;
                    }

                    let label = format!("{:?}", action);
                    match self.run_peer_action(&remote, action).await {
                        Ok(follow_up) => {
                            for next in follow_up.into_iter().rev() {
                                queue.push_front(next);
                            }
                        }
                        Err(e) => {
                            error!("{} for {} failed: {:#}", label, remote, e);
                            failed.insert(remote);
                        }
                    }
                }
            }
        }
    }

    async fn run_peer_action(
        &mut self,
        remote: &ConnectionId,
        action: PeerAction,
    ) -> Result<Vec<SessionAction>> {
        match action {
            PeerAction::OpenConnection => {
                self.negotiator
                    .open(remote, self.context.ice_servers(), self.events_tx.clone())
                    .await?;
            }

            PeerAction::AttachLocalTracks => match self.context.local_stream() {
                Some(stream) => self.negotiator.attach_local_tracks(remote, stream).await?,
                None => warn!("No local media; negotiating with {} without tracks", remote),
            },

            PeerAction::ApplyRemoteDescription(desc) => {
                self.negotiator.apply_remote_description(remote, &desc).await?;
                return Ok(self
                    .context
                    .on_peer_event(remote, PeerEvent::RemoteDescriptionApplied(desc.kind)));
            }

            PeerAction::CreateOffer => {
                let offer = self.negotiator.create_offer(remote).await?;
                return Ok(self
                    .context
                    .on_peer_event(remote, PeerEvent::LocalDescriptionReady(offer)));
            }

            PeerAction::CreateAnswer => {
                let answer = self.negotiator.create_answer(remote).await?;
                return Ok(self
                    .context
                    .on_peer_event(remote, PeerEvent::LocalDescriptionReady(answer)));
            }

            PeerAction::AddIceCandidate(candidate) => {
                self.negotiator.add_ice_candidate(remote, &candidate).await?;
            }

            PeerAction::Send(message) => self.send(message),

            PeerAction::ShowRemote { track_id } => self.surface.show_remote(remote, &track_id),

            PeerAction::RemoveRemote => {
                info!("Peer {} is gone", remote);
                self.surface.remove_remote(remote);
                self.negotiator.close(remote).await?;
            }
        }

        Ok(Vec::new())
    }

    fn send(&self, message: SignalMessage) {
        let event = message.event_name();
        if self.outbound.send(message).is_err() {
            warn!("Signaling channel closed; dropping {}", event);
        }
    }
}
