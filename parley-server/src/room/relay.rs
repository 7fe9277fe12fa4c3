use crate::room::room_command::RoomCommand;
use crate::room::room_registry::{JoinOutcome, RoomRegistry};
use crate::signaling::SignalingOutput;
use parley_core::{ConnectionId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single-task relay. Owns the room registry, so every join decision and
/// membership change happens inside one loop turn.
pub struct Relay {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                connection_id,
                room,
                peer_uuid,
            } => {
                if room.is_empty() {
                    warn!("Ignoring join with empty room from {}", connection_id);
                    return;
                }

                let outcome = self.registry.join(connection_id.clone(), room.clone());
                let reply = match outcome {
                    JoinOutcome::Created => {
                        info!(
                            "Creating room '{}' for {} (hint {:?})",
                            room, connection_id, peer_uuid
                        );
                        SignalMessage::RoomCreated {
                            room_id: room,
                            peer_id: connection_id.clone(),
                        }
                    }
                    JoinOutcome::Joined => {
                        info!(
                            "{} joined room '{}' ({} members, hint {:?})",
                            connection_id,
                            room,
                            self.registry.size(&room),
                            peer_uuid
                        );
                        SignalMessage::RoomJoined {
                            room_id: room,
                            peer_id: connection_id.clone(),
                        }
                    }
                };

                self.signaling.deliver(&connection_id, reply).await;
            }

            RoomCommand::Signal {
                connection_id,
                message,
            } => self.relay_signal(connection_id, message).await,

            RoomCommand::Disconnect { connection_id } => {
                let Some(room) = self.registry.leave(&connection_id) else {
                    debug!("{} disconnected without joining a room", connection_id);
                    return;
                };
                info!(
                    "{} left room '{}' ({} members remain)",
                    connection_id,
                    room,
                    self.registry.size(&room)
                );
            }
        }
    }

    async fn relay_signal(&self, from: ConnectionId, message: SignalMessage) {
        match &message {
            SignalMessage::StartCall { room_id, sender_id } => {
                let targets: Vec<ConnectionId> = self
                    .registry
                    .members(room_id)
                    .filter(|member| **member != from)
                    .cloned()
                    .collect();

                debug!(
                    "Broadcasting start_call in room '{}' from {} to {} peers",
                    room_id,
                    sender_id,
                    targets.len()
                );

                for target in targets {
                    self.signaling.deliver(&target, message.clone()).await;
                }
            }

            SignalMessage::WebrtcIceCandidate { candidate, .. } if candidate.trim().is_empty() => {
                debug!("Dropping end-of-candidates marker from {}", from);
            }

            SignalMessage::WebrtcOffer {
                room_id,
                sender_id,
                receiver_id,
                ..
            }
            | SignalMessage::WebrtcAnswer {
                room_id,
                sender_id,
                receiver_id,
                ..
            }
            | SignalMessage::WebrtcIceCandidate {
                room_id,
                sender_id,
                receiver_id,
                ..
            } => {
                debug!(
                    "Sending {} in room '{}' from {} to {}",
                    message.event_name(),
                    room_id,
                    sender_id,
                    receiver_id
                );
                self.signaling.deliver(receiver_id, message.clone()).await;
            }

            other => {
                warn!(
                    "Connection {} sent non-relayable event '{}'",
                    from,
                    other.event_name()
                );
            }
        }
    }
}
