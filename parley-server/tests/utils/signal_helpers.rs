use anyhow::{Context, Result};
use parley_core::{ConnectionId, RoomId, SessionDescription, SignalMessage};
use parley_server::RoomCommand;
use std::time::Duration;
use tokio::sync::mpsc;

use super::mock_signaling::Delivery;

/// Timeout for a single expected delivery (ms).
pub const DELIVERY_TIMEOUT_MS: u64 = 2000;

/// How long to listen before concluding nothing else was sent (ms).
pub const QUIET_PERIOD_MS: u64 = 150;

pub async fn join(
    relay_tx: &mpsc::Sender<RoomCommand>,
    connection_id: &ConnectionId,
    room: &str,
) -> Result<()> {
    relay_tx
        .send(RoomCommand::Join {
            connection_id: connection_id.clone(),
            room: RoomId::from(room),
            peer_uuid: None,
        })
        .await
        .context("Failed to send Join")
}

pub async fn signal(
    relay_tx: &mpsc::Sender<RoomCommand>,
    connection_id: &ConnectionId,
    message: SignalMessage,
) -> Result<()> {
    relay_tx
        .send(RoomCommand::Signal {
            connection_id: connection_id.clone(),
            message,
        })
        .await
        .context("Failed to send Signal")
}

pub async fn disconnect(
    relay_tx: &mpsc::Sender<RoomCommand>,
    connection_id: &ConnectionId,
) -> Result<()> {
    relay_tx
        .send(RoomCommand::Disconnect {
            connection_id: connection_id.clone(),
        })
        .await
        .context("Failed to send Disconnect")
}

/// Wait for the next delivery the relay makes, to anyone.
pub async fn next_delivery(rx: &mut mpsc::UnboundedReceiver<Delivery>) -> Result<Delivery> {
    match tokio::time::timeout(Duration::from_millis(DELIVERY_TIMEOUT_MS), rx.recv()).await {
        Ok(Some(delivery)) => Ok(delivery),
        Ok(None) => anyhow::bail!("Delivery channel closed"),
        Err(_) => anyhow::bail!("Timeout waiting for a delivery"),
    }
}

/// Fails if the relay delivers anything during the quiet period.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Delivery>) {
    let res = tokio::time::timeout(Duration::from_millis(QUIET_PERIOD_MS), rx.recv()).await;
    if let Ok(Some(delivery)) = res {
        panic!("Unexpected delivery: {:?}", delivery);
    }
}

/// Join and return the role-specific reply the joiner got.
pub async fn join_and_expect(
    relay_tx: &mpsc::Sender<RoomCommand>,
    rx: &mut mpsc::UnboundedReceiver<Delivery>,
    connection_id: &ConnectionId,
    room: &str,
) -> Result<SignalMessage> {
    join(relay_tx, connection_id, room).await?;
    let delivery = next_delivery(rx).await?;
    anyhow::ensure!(
        &delivery.to == connection_id,
        "Join reply went to {} instead of {}",
        delivery.to,
        connection_id
    );
    Ok(delivery.message)
}

pub fn offer(from: &ConnectionId, to: &ConnectionId, room: &str) -> SignalMessage {
    SignalMessage::WebrtcOffer {
        sdp: SessionDescription::offer(format!("v=0 offer from {from}")).to_value(),
        sender_id: from.clone(),
        room_id: RoomId::from(room),
        receiver_id: to.clone(),
    }
}

pub fn answer(from: &ConnectionId, to: &ConnectionId, room: &str) -> SignalMessage {
    SignalMessage::WebrtcAnswer {
        sdp: SessionDescription::answer(format!("v=0 answer from {from}")).to_value(),
        sender_id: from.clone(),
        room_id: RoomId::from(room),
        receiver_id: to.clone(),
    }
}

pub fn ice(from: &ConnectionId, to: &ConnectionId, room: &str, candidate: &str) -> SignalMessage {
    SignalMessage::WebrtcIceCandidate {
        sender_id: from.clone(),
        receiver_id: to.clone(),
        room_id: RoomId::from(room),
        label: Some(0),
        candidate: candidate.to_string(),
    }
}

pub fn start_call(from: &ConnectionId, room: &str) -> SignalMessage {
    SignalMessage::StartCall {
        room_id: RoomId::from(room),
        sender_id: from.clone(),
    }
}
