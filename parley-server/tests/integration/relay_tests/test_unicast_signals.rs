use parley_core::ConnectionId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{answer, assert_quiet, ice, join_and_expect, next_delivery, offer, signal};

#[tokio::test]
async fn test_signals_reach_only_the_receiver() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();
    let a = ConnectionId::new();
    let b = ConnectionId::new();
    let c = ConnectionId::new();

    for peer in [&a, &b, &c] {
        join_and_expect(&relay_tx, &mut delivery_rx, peer, "r1")
            .await
            .expect("Join failed");
    }

    let messages = [
        (a.clone(), b.clone(), offer(&a, &b, "r1")),
        (b.clone(), a.clone(), answer(&b, &a, "r1")),
        (
            a.clone(),
            b.clone(),
            ice(&a, &b, "r1", "candidate:1 1 udp 2122260223 10.0.0.2 54400 typ host"),
        ),
    ];

    for (from, to, message) in messages {
        signal(&relay_tx, &from, message.clone())
            .await
            .expect("Signal failed");

        let delivery = next_delivery(&mut delivery_rx)
            .await
            .expect("Signal not delivered");
        assert_eq!(delivery.to, to);
        assert_eq!(delivery.message, message, "Payload must pass through untouched");

        assert_quiet(&mut delivery_rx).await;
    }
}

#[tokio::test]
async fn test_receiver_outside_room_is_still_addressed() {
    init_tracing();

    let (relay_tx, mut delivery_rx, _signaling) = create_test_relay();
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    join_and_expect(&relay_tx, &mut delivery_rx, &a, "r1")
        .await
        .expect("Join failed");
    join_and_expect(&relay_tx, &mut delivery_rx, &b, "r2")
        .await
        .expect("Join failed");

    // The room on the envelope is context only; receiverId decides delivery.
    signal(&relay_tx, &a, offer(&a, &b, "r1"))
        .await
        .expect("Signal failed");

    let delivery = next_delivery(&mut delivery_rx)
        .await
        .expect("Offer not delivered");
    assert_eq!(delivery.to, b);
}
