use crate::error::ClientError;
use futures::{SinkExt, StreamExt};
use parley_core::SignalMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Both directions of a signaling socket as typed channels.
pub struct SignalingChannel {
    pub outbound: mpsc::UnboundedSender<SignalMessage>,
    pub inbound: mpsc::UnboundedReceiver<SignalMessage>,
}

/// Opens the WebSocket and spawns one writer and one reader task for it.
///
/// Undecodable frames are logged and skipped. `inbound` closes when the socket does.
pub async fn connect(url: &str) -> Result<SignalingChannel, ClientError> {
    let (socket, _) = connect_async(url).await?;
    info!("Connected to signaling server at {}", url);

    let (mut sink, mut stream) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<SignalMessage>();
    let (inbound_tx, inbound) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to encode {}: {}", message.event_name(), e);
                    continue;
                }
            };
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Signaling socket error: {}", e);
                    break;
                }
            };

            match SignalMessage::from_json(text.as_str()) {
                Ok(message) => {
                    if inbound_tx.send(message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Skipping malformed frame: {}", e),
            }
        }
        debug!("Signaling socket reader finished");
    });

    Ok(SignalingChannel { outbound, inbound })
}
