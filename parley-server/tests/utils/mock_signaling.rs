use async_trait::async_trait;
use parley_core::{ConnectionId, SignalMessage};
use parley_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// One message handed to the output by the relay.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: SignalMessage,
}

/// Mock SignalingOutput that captures every delivery.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<Delivery>,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            deliveries: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// All messages delivered to one connection so far.
    pub async fn delivered_to(&self, connection_id: &ConnectionId) -> Vec<SignalMessage> {
        self.deliveries
            .lock()
            .await
            .iter()
            .filter(|d| &d.to == connection_id)
            .map(|d| d.message.clone())
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn deliver(&self, connection_id: &ConnectionId, message: SignalMessage) {
        tracing::debug!(
            "[MockSignaling] {} to {}",
            message.event_name(),
            connection_id
        );

        let delivery = Delivery {
            to: connection_id.clone(),
            message,
        };

        self.deliveries.lock().await.push(delivery.clone());
        let _ = self.tx.send(delivery);
    }
}
