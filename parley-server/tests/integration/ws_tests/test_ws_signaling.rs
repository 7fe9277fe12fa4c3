use parley_core::{RoomId, SignalMessage};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, spawn_server};

async fn join_room(client: &mut WsTestClient, room: &str) -> SignalMessage {
    let config = client.recv().await.expect("No ice_config");
    assert!(matches!(config, SignalMessage::IceConfig { ref ice_servers } if !ice_servers.is_empty()));

    client
        .send(&SignalMessage::Join {
            room: RoomId::from(room),
            peer_uuid: None,
        })
        .await
        .expect("Send failed");
    client.recv().await.expect("No join reply")
}

#[tokio::test]
async fn test_ws_join_and_start_call() {
    init_tracing();

    let addr = spawn_server().await.expect("Server failed to start");
    let mut a = WsTestClient::connect(addr).await.expect("A failed to connect");
    let mut b = WsTestClient::connect(addr).await.expect("B failed to connect");

    let SignalMessage::RoomCreated { peer_id: a_id, .. } = join_room(&mut a, "r1").await else {
        panic!("A should have created the room");
    };
    let SignalMessage::RoomJoined { peer_id: b_id, .. } = join_room(&mut b, "r1").await else {
        panic!("B should have joined the room");
    };
    assert_ne!(a_id, b_id, "Identities are per connection");
    assert!(a.is_quiet(150).await);

    b.send(&SignalMessage::StartCall {
        room_id: RoomId::from("r1"),
        sender_id: b_id.clone(),
    })
    .await
    .expect("Send failed");

    assert_eq!(
        a.recv().await.expect("No start_call"),
        SignalMessage::StartCall {
            room_id: RoomId::from("r1"),
            sender_id: b_id,
        }
    );
    assert!(b.is_quiet(150).await);

    a.close().await.expect("Close failed");
    b.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_ws_survives_malformed_frames() {
    init_tracing();

    let addr = spawn_server().await.expect("Server failed to start");
    let mut a = WsTestClient::connect(addr).await.expect("Failed to connect");

    a.recv().await.expect("No ice_config");
    a.send_raw("not json").await.expect("Send failed");
    a.send_raw(r#"{"event":"room_created","data":{}}"#)
        .await
        .expect("Send failed");

    a.send(&SignalMessage::Join {
        room: RoomId::from("r1"),
        peer_uuid: Some("advisory".to_string()),
    })
    .await
    .expect("Send failed");

    assert!(matches!(
        a.recv().await.expect("No reply"),
        SignalMessage::RoomCreated { .. }
    ));
}

#[tokio::test]
async fn test_ws_description_passes_through_verbatim() {
    init_tracing();

    let addr = spawn_server().await.expect("Server failed to start");
    let mut a = WsTestClient::connect(addr).await.expect("A failed to connect");
    let mut b = WsTestClient::connect(addr).await.expect("B failed to connect");

    let SignalMessage::RoomCreated { peer_id: a_id, .. } = join_room(&mut a, "r1").await else {
        panic!("A should have created the room");
    };
    let SignalMessage::RoomJoined { peer_id: b_id, .. } = join_room(&mut b, "r1").await else {
        panic!("B should have joined the room");
    };

    // A provisional answer with a field no peer here understands.
    let payload = json!({"type": "pranswer", "sdp": "v=0\r\n", "x": 1});
    let frame = json!({
        "event": "webrtc_answer",
        "data": {
            "sdp": payload.clone(),
            "senderId": b_id.to_string(),
            "roomId": "r1",
            "receiverId": a_id.to_string(),
        }
    });
    b.send_raw(&frame.to_string()).await.expect("Send failed");

    match a.recv().await.expect("No answer relayed") {
        SignalMessage::WebrtcAnswer { sdp, sender_id, .. } => {
            assert_eq!(sdp, payload);
            assert_eq!(sender_id, b_id);
        }
        other => panic!("expected answer, got {:?}", other),
    }
}
