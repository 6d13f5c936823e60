use crate::fixtures::test_app::{TestApp, WsClient};
use huddle_protocol::{ClientEvent, DeviceSettings};
use serde_json::Value;

async fn host_and_participant(app: &TestApp, meeting_id: &str) -> (WsClient, WsClient) {
    let mut host = app.connect_ws().await;
    host.send(&ClientEvent::HostJoinMeeting {
        meeting_id: meeting_id.to_string(),
        name: "Host".to_string(),
    })
    .await;
    host.recv_type("meeting-joined").await;

    let mut alice = app.connect_ws().await;
    alice
        .send(&ClientEvent::RequestJoinMeeting {
            meeting_id: meeting_id.to_string(),
            participant_name: "Alice".to_string(),
            device_settings: DeviceSettings::default(),
        })
        .await;
    alice.recv_type("meeting-joined").await;

    (host, alice)
}

#[tokio::test]
async fn approved_request_flips_the_permission_for_everyone() {
    let app = TestApp::spawn().await;
    let (mut host, mut alice) = host_and_participant(&app, "m-rec").await;

    alice
        .send(&ClientEvent::RequestRecordingPermission {
            display_name: "Alice".to_string(),
        })
        .await;

    let asked = host.recv_type("recording-permission-requested").await;
    assert_eq!(asked["data"]["request"]["display_name"], "Alice");
    assert_eq!(asked["data"]["pending_count"], 1);
    let request_id = asked["data"]["request"]["request_id"]
        .as_str()
        .unwrap()
        .to_string();

    host.send(&ClientEvent::RespondRecordingRequest {
        request_id,
        approve: true,
    })
    .await;

    for client in [&mut host, &mut alice] {
        let changed = client.recv_type("recording-permission-changed").await;
        assert_eq!(changed["data"]["permission"], "Record to Computer");
        assert_eq!(changed["data"]["changed_by"], "Host");
    }

    let resp = app
        .client
        .get(app.url("/api/recording-permission?meeting_id=m-rec"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["permission"], "Record to Computer");
}

#[tokio::test]
async fn denied_request_notifies_only_the_requester() {
    let app = TestApp::spawn().await;
    let (mut host, mut alice) = host_and_participant(&app, "m-rec-deny").await;

    alice
        .send(&ClientEvent::RequestRecordingPermission {
            display_name: "Alice".to_string(),
        })
        .await;
    let asked = host.recv_type("recording-permission-requested").await;
    let request_id = asked["data"]["request"]["request_id"]
        .as_str()
        .unwrap()
        .to_string();

    host.send(&ClientEvent::RespondRecordingRequest {
        request_id: request_id.clone(),
        approve: false,
    })
    .await;

    let denied = alice.recv_type("recording-request-denied").await;
    assert_eq!(denied["data"]["request_id"], request_id.as_str());

    // The meeting-wide permission stays untouched.
    let resp = app
        .client
        .get(app.url("/api/recording-permission?meeting_id=m-rec-deny"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["permission"], "Don't Record");
}

#[tokio::test]
async fn suppression_is_enforced_server_side() {
    let app = TestApp::spawn().await;
    let (mut host, alice) = host_and_participant(&app, "m-rec-mute").await;

    host.send(&ClientEvent::SuppressRecordingRequests { suppressed: true })
        .await;

    // The HTTP request path reports the suppression instead of queueing.
    let resp = app
        .client
        .post(app.url("/api/request-recording-permission"))
        .json(&serde_json::json!({
            "meeting_id": "m-rec-mute",
            "socket_id": alice.socket_id,
            "display_name": "Alice",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "suppressed");
}

#[tokio::test]
async fn http_permission_write_is_gated_and_broadcast() {
    let app = TestApp::spawn().await;
    let (host, mut alice) = host_and_participant(&app, "m-rec-http").await;

    // A participant cannot set the permission.
    let resp = app
        .client
        .post(app.url("/api/recording-permission"))
        .json(&serde_json::json!({
            "meeting_id": "m-rec-http",
            "socket_id": alice.socket_id,
            "permission": "Record to Computer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // The host can, and the room hears about it over the socket.
    let resp = app
        .client
        .post(app.url("/api/recording-permission"))
        .json(&serde_json::json!({
            "meeting_id": "m-rec-http",
            "socket_id": host.socket_id,
            "permission": "Record to Computer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let changed = alice.recv_type("recording-permission-changed").await;
    assert_eq!(changed["data"]["permission"], "Record to Computer");
}
