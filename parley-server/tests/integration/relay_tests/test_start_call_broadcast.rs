use parley_core::{ConnectionId, RoomId, SignalMessage};
use std::collections::HashSet;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_quiet, join_and_expect, next_delivery, signal, start_call};

#[tokio::test]
async fn test_start_call_reaches_every_other_member() {
    init_tracing();

    let (relay_tx, mut delivery_rx, signaling) = create_test_relay();
    let members: Vec<ConnectionId> = (0..3).map(|_| ConnectionId::new()).collect();
    let outsider = ConnectionId::new();
    let caller = ConnectionId::new();

    for peer in &members {
        join_and_expect(&relay_tx, &mut delivery_rx, peer, "r1")
            .await
            .expect("Join failed");
    }
    join_and_expect(&relay_tx, &mut delivery_rx, &outsider, "r2")
        .await
        .expect("Join failed");
    join_and_expect(&relay_tx, &mut delivery_rx, &caller, "r1")
        .await
        .expect("Join failed");

    signal(&relay_tx, &caller, start_call(&caller, "r1"))
        .await
        .expect("Signal failed");

    let mut reached = HashSet::new();
    for _ in 0..members.len() {
        let delivery = next_delivery(&mut delivery_rx)
            .await
            .expect("start_call not delivered");
        assert_eq!(
            delivery.message,
            SignalMessage::StartCall {
                room_id: RoomId::from("r1"),
                sender_id: caller.clone(),
            }
        );
        reached.insert(delivery.to);
    }
    assert_quiet(&mut delivery_rx).await;

    assert_eq!(reached, members.iter().cloned().collect::<HashSet<_>>());
    assert_eq!(signaling.delivered_to(&caller).await.len(), 1);
    assert_eq!(signaling.delivered_to(&outsider).await.len(), 1);
}

#[tokio::test]
async fn test_start_call_in_lonely_room_goes_nowhere() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();
    let a = ConnectionId::new();

    join_and_expect(&relay_tx, &mut delivery_rx, &a, "r1")
        .await
        .expect("Join failed");
    signal(&relay_tx, &a, start_call(&a, "r1"))
        .await
        .expect("Signal failed");

    assert_quiet(&mut delivery_rx).await;
}
