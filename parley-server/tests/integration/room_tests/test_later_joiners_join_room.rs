use parley_core::{ConnectionId, RoomId, SignalMessage};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_quiet, join_and_expect};

#[tokio::test]
async fn test_later_joiners_join_room() {
    init_tracing();

    let (relay_tx, mut delivery_rx, signaling) = create_test_relay();
    let peers: Vec<ConnectionId> = (0..4).map(|_| ConnectionId::new()).collect();

    for (n, peer) in peers.iter().enumerate() {
        let reply = join_and_expect(&relay_tx, &mut delivery_rx, peer, "r1")
            .await
            .unwrap_or_else(|_| panic!("Join failed for peer {}", n));

        let expected = if n == 0 {
            SignalMessage::RoomCreated {
                room_id: RoomId::from("r1"),
                peer_id: peer.clone(),
            }
        } else {
            SignalMessage::RoomJoined {
                room_id: RoomId::from("r1"),
                peer_id: peer.clone(),
            }
        };
        assert_eq!(reply, expected, "Wrong reply for peer {}", n);

        // Nobody else hears about the join.
        assert_quiet(&mut delivery_rx).await;
    }

    for peer in &peers {
        assert_eq!(signaling.delivered_to(peer).await.len(), 1);
    }
}

#[tokio::test]
async fn test_rooms_are_independent() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    let reply_a = join_and_expect(&relay_tx, &mut delivery_rx, &a, "r1")
        .await
        .expect("Join failed");
    let reply_b = join_and_expect(&relay_tx, &mut delivery_rx, &b, "r2")
        .await
        .expect("Join failed");

    assert!(matches!(reply_a, SignalMessage::RoomCreated { .. }));
    assert!(matches!(reply_b, SignalMessage::RoomCreated { .. }));
}
