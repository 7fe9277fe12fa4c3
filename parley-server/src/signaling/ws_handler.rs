use crate::AppState;
use crate::room::RoomCommand;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use parley_core::{ConnectionId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let service = state.signaling.clone();

    ws.on_upgrade(move |socket| handle_socket(socket, ConnectionId::new(), service))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, service: SignalingService) {
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(connection_id.clone(), tx);
    service.send_signal(
        &connection_id,
        SignalMessage::IceConfig {
            ice_servers: service.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let connection_id = connection_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        let signal = match SignalMessage::from_json(text.as_str()) {
                            Ok(signal) => signal,
                            Err(e) => {
                                warn!("Invalid SignalMessage from {}: {}", connection_id, e);
                                continue;
                            }
                        };

                        let cmd = match signal {
                            SignalMessage::Join { room, peer_uuid } => RoomCommand::Join {
                                connection_id: connection_id.clone(),
                                room,
                                peer_uuid,
                            },
                            SignalMessage::IceConfig { .. }
                            | SignalMessage::RoomCreated { .. }
                            | SignalMessage::RoomJoined { .. } => {
                                warn!(
                                    "Ignoring server-only event '{}' from {}",
                                    signal.event_name(),
                                    connection_id
                                );
                                continue;
                            }
                            message => RoomCommand::Signal {
                                connection_id: connection_id.clone(),
                                message,
                            },
                        };

                        if let Err(e) = service.relay_tx.send(cmd).await {
                            error!("Relay died: {}", e);
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&connection_id);
    let _ = service
        .relay_tx
        .send(RoomCommand::Disconnect {
            connection_id: connection_id.clone(),
        })
        .await;
    info!("WebSocket disconnected: {}", connection_id);
}
