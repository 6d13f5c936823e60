use crate::fixtures::test_app::TestApp;
use huddle_client::{MeetingSnapshot, OptimisticRoster, ReplicaPhase};
use huddle_protocol::{ClientEvent, DeviceSettings, ServerEvent};
use serde_json::Value;

/// Runs a real participant connection through the client replica: every frame
/// the server pushes is applied to a MeetingSnapshot, which must end up
/// agreeing with the authoritative HTTP view.
#[tokio::test]
async fn snapshot_replica_tracks_the_server() {
    let app = TestApp::spawn_with_settings(|s| {
        s.meeting.waiting_room_enabled = true;
        s.meeting.welcome_message = Some("Welcome!".to_string());
    })
    .await;

    let mut host = app.connect_ws().await;
    host.send(&ClientEvent::HostJoinMeeting {
        meeting_id: "m-replica".to_string(),
        name: "Host".to_string(),
    })
    .await;
    host.recv_type("meeting-joined").await;

    let mut alice = app.connect_ws().await;
    let mut replica = MeetingSnapshot::new();
    replica.apply(&ServerEvent::Connected {
        socket_id: alice.socket_id.clone(),
    });

    alice
        .send(&ClientEvent::RequestJoinMeeting {
            meeting_id: "m-replica".to_string(),
            participant_name: "Alice".to_string(),
            device_settings: DeviceSettings::default(),
        })
        .await;

    let waiting = alice.recv_type("waiting-room-joined").await;
    replica.apply(&parse(&waiting));
    assert_eq!(
        replica.phase,
        ReplicaPhase::Waiting {
            welcome_message: Some("Welcome!".to_string())
        }
    );

    host.recv_type("waiting-room-participant-joined").await;
    host.send(&ClientEvent::AdmitParticipant {
        meeting_id: "m-replica".to_string(),
        participant_socket_id: alice.socket_id.clone(),
    })
    .await;

    let admitted = alice.recv_type("waiting-room-admitted").await;
    replica.apply(&parse(&admitted));
    assert_eq!(replica.phase, ReplicaPhase::InMeeting);
    assert_eq!(replica.me().unwrap().name, "Alice");

    // Authoritative and replicated rosters agree.
    let resp = app
        .client
        .get(app.url("/api/meeting/m-replica/participant"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(
        json["participants"].as_array().unwrap().len(),
        replica.participants.len()
    );
}

#[tokio::test]
async fn optimistic_echo_is_rolled_back_on_rejection() {
    let app = TestApp::spawn().await;

    let mut host = app.connect_ws().await;
    host.send(&ClientEvent::HostJoinMeeting {
        meeting_id: "m-optim".to_string(),
        name: "Host".to_string(),
    })
    .await;
    host.recv_type("meeting-joined").await;
    host.send(&ClientEvent::UpdateMeetingPermissions {
        permissions: huddle_protocol::MeetingPermissionsPatch {
            allow_hand_raising: Some(false),
            ..Default::default()
        },
    })
    .await;
    host.recv_type("meeting-permissions-updated").await;

    let mut alice = app.connect_ws().await;
    let mut replica = MeetingSnapshot::new();
    let mut optimistic = OptimisticRoster::new();
    replica.apply(&ServerEvent::Connected {
        socket_id: alice.socket_id.clone(),
    });

    alice
        .send(&ClientEvent::RequestJoinMeeting {
            meeting_id: "m-optim".to_string(),
            participant_name: "Alice".to_string(),
            device_settings: DeviceSettings::default(),
        })
        .await;
    let joined = alice.recv_type("meeting-joined").await;
    replica.apply(&parse(&joined));

    // Local echo first, server rejection second, replica back where it was.
    let event = optimistic.stage_hand_raise(&mut replica, true).unwrap();
    assert!(replica.me().unwrap().is_hand_raised);
    alice.send(&event).await;

    let err = alice.recv_type("action-error").await;
    let err_event = parse(&err);
    optimistic.reconcile(&mut replica, &err_event);
    assert!(!replica.me().unwrap().is_hand_raised);
    assert_eq!(optimistic.pending_count(), 0);
}

fn parse(frame: &Value) -> ServerEvent {
    serde_json::from_value(frame.clone()).expect("unparseable server event")
}
