use crate::room::RoomCommand;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use parley_core::{ConnectionId, IceServerConfig, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Table of live sockets, and the entry point from sockets into the relay.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_tx: mpsc::Sender<RoomCommand>,
}

impl SignalingService {
    pub fn new(relay_tx: mpsc::Sender<RoomCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
            relay_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    pub fn remove_peer(&self, connection_id: &ConnectionId) {
        self.inner.peers.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }

    /// Returns false when nothing was queued for the connection.
    pub fn send_signal(&self, connection_id: &ConnectionId, msg: SignalMessage) -> bool {
        let Some(peer) = self.inner.peers.get(connection_id) else {
            debug!(
                "Dropping {} for unknown connection {}",
                msg.event_name(),
                connection_id
            );
            return false;
        };

        match msg.to_json() {
            Ok(json) => match peer.send(Message::Text(json.into())) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to queue WS message to {}: {:?}", connection_id, e);
                    false
                }
            },
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, connection_id: &ConnectionId, message: SignalMessage) {
        self.send_signal(connection_id, message);
    }
}
