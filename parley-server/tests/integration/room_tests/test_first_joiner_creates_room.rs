use parley_core::{ConnectionId, RoomId, SignalMessage};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_quiet, join_and_expect};

#[tokio::test]
async fn test_first_joiner_creates_room() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();
    let a = ConnectionId::new();

    let reply = join_and_expect(&relay_tx, &mut delivery_rx, &a, "r1")
        .await
        .expect("Join failed");

    assert_eq!(
        reply,
        SignalMessage::RoomCreated {
            room_id: RoomId::from("r1"),
            peer_id: a,
        }
    );
    assert_quiet(&mut delivery_rx).await;
}

#[tokio::test]
async fn test_empty_room_name_is_ignored() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();

    crate::utils::join(&relay_tx, &ConnectionId::new(), "")
        .await
        .expect("Send failed");

    assert_quiet(&mut delivery_rx).await;
}
