use crate::fixtures::test_app::TestApp;
use huddle_protocol::ClientEvent;
use serde_json::Value;

#[tokio::test]
async fn global_chat_flag_round_trips() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/chat-state"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["global_chat_disabled"], false);
    assert_eq!(json["meeting_chat_disabled"], Value::Null);

    let resp = app
        .client
        .post(app.url("/api/disable-chat"))
        .json(&serde_json::json!({ "disabled": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = app
        .client
        .get(app.url("/api/chat-state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["global_chat_disabled"], true);
}

#[tokio::test]
async fn meeting_chat_flag_is_scoped_and_gated() {
    let app = TestApp::spawn().await;

    let mut host = app.connect_ws().await;
    host.send(&ClientEvent::HostJoinMeeting {
        meeting_id: "m-chat".to_string(),
        name: "Host".to_string(),
    })
    .await;
    host.recv_type("meeting-joined").await;

    // Without a caller identity the meeting-scoped change is refused.
    let resp = app
        .client
        .post(app.url("/api/disable-chat"))
        .json(&serde_json::json!({ "meeting_id": "m-chat", "disabled": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // A non-host caller fails the gate.
    let resp = app
        .client
        .post(app.url("/api/disable-chat"))
        .json(&serde_json::json!({
            "meeting_id": "m-chat",
            "disabled": true,
            "changed_by": "someone-else",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // The host flips the meeting flag; the global flag stays put.
    let resp = app
        .client
        .post(app.url("/api/disable-chat"))
        .json(&serde_json::json!({
            "meeting_id": "m-chat",
            "disabled": true,
            "changed_by": host.socket_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["meeting_chat_disabled"], true);
    assert_eq!(json["global_chat_disabled"], false);

    // The room hears about the change over the socket.
    let changed = host.recv_type("chat-state-changed").await;
    assert_eq!(changed["data"]["chat_disabled"], true);
    assert_eq!(changed["data"]["changed_by"], "Host");
}
