use crate::fixtures::test_app::{TestApp, WsClient};
use huddle_protocol::{ClientEvent, DeviceSettings, MeetingPermissionsPatch};

async fn join_host(app: &TestApp, meeting_id: &str) -> WsClient {
    let mut host = app.connect_ws().await;
    host.send(&ClientEvent::HostJoinMeeting {
        meeting_id: meeting_id.to_string(),
        name: "Host".to_string(),
    })
    .await;
    host.recv_type("meeting-joined").await;
    host
}

async fn join_participant(app: &TestApp, meeting_id: &str, name: &str) -> WsClient {
    let mut client = app.connect_ws().await;
    client
        .send(&ClientEvent::RequestJoinMeeting {
            meeting_id: meeting_id.to_string(),
            participant_name: name.to_string(),
            device_settings: DeviceSettings::default(),
        })
        .await;
    client.recv_type("meeting-joined").await;
    client
}

#[tokio::test]
async fn rename_is_validated_and_broadcast() {
    let app = TestApp::spawn().await;
    let mut host = join_host(&app, "m-rename").await;
    let mut alice = join_participant(&app, "m-rename", "Alice").await;
    let mut bob = join_participant(&app, "m-rename", "Bob").await;

    // Collision with another participant, case-insensitive.
    bob.send(&ClientEvent::RenameParticipant {
        new_name: "ALICE".to_string(),
    })
    .await;
    let err = bob.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "name-taken");

    // Renaming to the current name gets a distinct rejection.
    bob.send(&ClientEvent::RenameParticipant {
        new_name: "Bob".to_string(),
    })
    .await;
    let err = bob.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "name-unchanged");

    // Empty after trimming.
    bob.send(&ClientEvent::RenameParticipant {
        new_name: "   ".to_string(),
    })
    .await;
    let err = bob.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "validation");

    // A valid rename reaches the whole room.
    bob.send(&ClientEvent::RenameParticipant {
        new_name: "Robert".to_string(),
    })
    .await;
    for client in [&mut host, &mut alice, &mut bob] {
        let renamed = client.recv_type("participant-renamed").await;
        assert_eq!(renamed["data"]["old_name"], "Bob");
        assert_eq!(renamed["data"]["new_name"], "Robert");
    }
}

#[tokio::test]
async fn permission_update_is_merged_and_broadcast() {
    let app = TestApp::spawn().await;
    let mut host = join_host(&app, "m-perms").await;
    let mut alice = join_participant(&app, "m-perms", "Alice").await;

    host.send(&ClientEvent::UpdateMeetingPermissions {
        permissions: MeetingPermissionsPatch {
            allow_rename: Some(false),
            ..Default::default()
        },
    })
    .await;

    for client in [&mut host, &mut alice] {
        let updated = client.recv_type("meeting-permissions-updated").await;
        assert_eq!(updated["data"]["permissions"]["allow_rename"], false);
        // Untouched fields keep their defaults.
        assert_eq!(updated["data"]["permissions"]["chat_enabled"], true);
        assert_eq!(updated["data"]["changed_by"], "Host");
    }

    // The disabled permission now blocks participant renames...
    alice
        .send(&ClientEvent::RenameParticipant {
            new_name: "Alicia".to_string(),
        })
        .await;
    let err = alice.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "forbidden");

    // ...but not the host's own rename path.
    host.send(&ClientEvent::HostRenameSelf {
        new_name: "The Host".to_string(),
    })
    .await;
    let renamed = host.recv_type("participant-renamed").await;
    assert_eq!(renamed["data"]["new_name"], "The Host");
}

#[tokio::test]
async fn non_host_cannot_update_permissions() {
    let app = TestApp::spawn().await;
    let _host = join_host(&app, "m-perm-gate").await;
    let mut alice = join_participant(&app, "m-perm-gate", "Alice").await;

    alice
        .send(&ClientEvent::UpdateMeetingPermissions {
            permissions: MeetingPermissionsPatch {
                chat_enabled: Some(false),
                ..Default::default()
            },
        })
        .await;
    let err = alice.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "forbidden");
}

#[tokio::test]
async fn hand_raise_reaches_the_room() {
    let app = TestApp::spawn().await;
    let mut host = join_host(&app, "m-hand").await;
    let mut alice = join_participant(&app, "m-hand", "Alice").await;

    alice.send(&ClientEvent::RaiseHand).await;
    let raised = host.recv_type("hand-raise-changed").await;
    assert_eq!(raised["data"]["socket_id"], alice.socket_id.as_str());
    assert_eq!(raised["data"]["is_hand_raised"], true);

    alice.send(&ClientEvent::LowerHand).await;
    let lowered = host.recv_type("hand-raise-changed").await;
    assert_eq!(lowered["data"]["is_hand_raised"], false);
}

#[tokio::test]
async fn co_host_passes_the_mutation_gate() {
    let app = TestApp::spawn().await;
    let mut host = join_host(&app, "m-cohost").await;
    let mut alice = join_participant(&app, "m-cohost", "Alice").await;

    host.send(&ClientEvent::SetCoHost {
        participant_socket_id: alice.socket_id.clone(),
        is_co_host: true,
    })
    .await;
    let change = alice.recv_type("co-host-changed").await;
    assert_eq!(change["data"]["is_co_host"], true);

    // A co-host may now lock the meeting.
    alice
        .send(&ClientEvent::ToggleMeetingLock { is_locked: true })
        .await;
    let changed = alice.recv_type("meeting-lock-changed").await;
    assert_eq!(changed["data"]["is_locked"], true);
}

#[tokio::test]
async fn malformed_frames_get_an_error_not_a_drop() {
    let app = TestApp::spawn().await;
    let mut client = app.connect_ws().await;

    client.send_raw("{\"type\": \"no-such-event\"}").await;
    let err = client.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "malformed-event");

    client.send_raw("not even json").await;
    let err = client.recv_type("action-error").await;
    assert_eq!(err["data"]["code"], "malformed-event");
}
