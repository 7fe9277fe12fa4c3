use parley_core::ConnectionId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_quiet, ice, join_and_expect, next_delivery, signal};

#[tokio::test]
async fn test_empty_candidate_is_not_forwarded() {
    init_tracing();

    let (relay_tx, mut delivery_rx, signaling) = create_test_relay();
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    for peer in [&a, &b] {
        join_and_expect(&relay_tx, &mut delivery_rx, peer, "r1")
            .await
            .expect("Join failed");
    }

    signal(&relay_tx, &a, ice(&a, &b, "r1", ""))
        .await
        .expect("Signal failed");
    assert_quiet(&mut delivery_rx).await;

    // A real candidate afterwards still goes through.
    let real = ice(&a, &b, "r1", "candidate:2 1 udp 1686052607 203.0.113.7 61000 typ srflx");
    signal(&relay_tx, &a, real.clone())
        .await
        .expect("Signal failed");

    let delivery = next_delivery(&mut delivery_rx)
        .await
        .expect("Candidate not delivered");
    assert_eq!(delivery.to, b);
    assert_eq!(delivery.message, real);

    assert_eq!(signaling.delivered_to(&b).await.len(), 2);
}
