use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::Response,
};
use futures::{SinkExt, StreamExt};
use huddle_protocol::{ClientEvent, ServerEvent};
use huddle_services::MeetingError;
use huddle_services::meeting::registry::{
    DisconnectOutcome, JoinOutcome, JoinedMeeting, RecordingAsk, RecordingReply,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;
use super::dispatcher;

pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let socket_id = Uuid::new_v4().to_string();
    info!(%socket_id, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    state.ws_storage.add(socket_id.clone(), sender.clone());

    dispatcher::send_to_socket(
        &state.ws_storage,
        &socket_id,
        &ServerEvent::Connected {
            socket_id: socket_id.clone(),
        },
    )
    .await;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_frame(&state, &socket_id, &text).await;
            }
            Ok(Message::Ping(data)) => {
                let mut guard = sender.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                warn!(%socket_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.ws_storage.remove(&socket_id);
    notify_departure(&state, &socket_id).await;

    info!(%socket_id, "WebSocket disconnected");
}

/// Parses one inbound frame and dispatches it. A frame that does not parse
/// into a known event is answered with `action-error`, never dropped on the
/// floor and never allowed to take the handler down.
async fn handle_client_frame(state: &AppState, socket_id: &str, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(%socket_id, %e, "Malformed client frame");
            action_error(state, socket_id, "malformed-event", &e.to_string()).await;
            return;
        }
    };

    debug!(%socket_id, ?event, "WS event received");

    match event {
        ClientEvent::HostJoinMeeting { meeting_id, name } => {
            match state.meetings.host_join(&meeting_id, socket_id, &name) {
                Ok(joined) => announce_joined(state, &joined, false).await,
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::RequestJoinMeeting {
            meeting_id,
            participant_name,
            device_settings,
        } => {
            match state
                .meetings
                .request_join(&meeting_id, socket_id, &participant_name, device_settings)
            {
                Ok(JoinOutcome::Locked) => {
                    dispatcher::send_to_socket(
                        &state.ws_storage,
                        socket_id,
                        &ServerEvent::MeetingLocked { meeting_id },
                    )
                    .await;
                }
                Ok(JoinOutcome::Queued {
                    waiting,
                    waiting_count,
                    position,
                    welcome_message,
                    host_socket_id,
                }) => {
                    dispatcher::send_to_socket(
                        &state.ws_storage,
                        socket_id,
                        &ServerEvent::WaitingRoomJoined {
                            meeting_id,
                            welcome_message,
                            position,
                        },
                    )
                    .await;
                    if let Some(host) = host_socket_id {
                        dispatcher::send_to_socket(
                            &state.ws_storage,
                            &host,
                            &ServerEvent::WaitingRoomParticipantJoined {
                                participant: waiting,
                                waiting_count,
                            },
                        )
                        .await;
                    }
                }
                Ok(JoinOutcome::Admitted(joined)) => {
                    announce_joined(state, &joined, false).await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::AdmitParticipant {
            meeting_id,
            participant_socket_id,
        } => match state.meetings.admit(&meeting_id, socket_id, &participant_socket_id) {
            Ok(Some(joined)) => announce_joined(state, &joined, true).await,
            Ok(None) => {} // already admitted or gone: no-op
            Err(e) => report(state, socket_id, e).await,
        },
        ClientEvent::AdmitAllParticipants { meeting_id } => {
            match state.meetings.admit_all(&meeting_id, socket_id) {
                Ok(admitted) => {
                    for joined in &admitted {
                        announce_joined(state, joined, true).await;
                    }
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::DenyParticipant {
            meeting_id,
            participant_socket_id,
            reason,
        } => match state
            .meetings
            .deny(&meeting_id, socket_id, &participant_socket_id, reason)
        {
            Ok(Some(denied)) => {
                dispatcher::send_to_socket(
                    &state.ws_storage,
                    &denied.socket_id,
                    &ServerEvent::WaitingRoomDenied {
                        reason: denied.reason,
                    },
                )
                .await;
                dispatcher::send_to_socket(
                    &state.ws_storage,
                    socket_id,
                    &ServerEvent::WaitingRoomLeft {
                        waiting_count: denied.waiting_count,
                    },
                )
                .await;
            }
            Ok(None) => {}
            Err(e) => report(state, socket_id, e).await,
        },
        ClientEvent::ToggleMeetingLock { is_locked } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state.meetings.toggle_lock(&meeting_id, socket_id, is_locked) {
                Ok(change) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::MeetingLockChanged {
                            is_locked: change.is_locked,
                            changed_by: change.changed_by,
                        },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::UpdateWaitingRoomSettings {
            meeting_id,
            settings,
        } => match state
            .meetings
            .update_waiting_settings(&meeting_id, socket_id, &settings)
        {
            Ok(update) => {
                broadcast_to_meeting(
                    state,
                    &meeting_id,
                    &ServerEvent::WaitingRoomSettingsUpdated {
                        settings: update.settings,
                        changed_by: update.changed_by,
                    },
                )
                .await;
                // Disabling the waiting room admits the whole queue.
                for joined in &update.admitted {
                    announce_joined(state, joined, true).await;
                }
            }
            Err(e) => report(state, socket_id, e).await,
        },
        ClientEvent::UpdateMeetingPermissions { permissions } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state
                .meetings
                .update_permissions(&meeting_id, socket_id, &permissions)
            {
                Ok(update) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::MeetingPermissionsUpdated {
                            permissions: update.permissions,
                            changed_by: update.changed_by,
                            participants: update.participants,
                        },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::RenameParticipant { new_name } => {
            rename(state, socket_id, &new_name, false).await;
        }
        ClientEvent::HostRenameSelf { new_name } => {
            rename(state, socket_id, &new_name, true).await;
        }
        ClientEvent::RaiseHand => set_hand(state, socket_id, true).await,
        ClientEvent::LowerHand => set_hand(state, socket_id, false).await,
        ClientEvent::ToggleMute { is_muted } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state.meetings.set_muted(&meeting_id, socket_id, is_muted) {
                Ok(participant) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::ParticipantStateChanged { participant },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::ToggleCamera { is_camera_on } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state.meetings.set_camera(&meeting_id, socket_id, is_camera_on) {
                Ok(participant) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::ParticipantStateChanged { participant },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::SetCoHost {
            participant_socket_id,
            is_co_host,
        } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state
                .meetings
                .set_co_host(&meeting_id, socket_id, &participant_socket_id, is_co_host)
            {
                Ok(change) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::CoHostChanged {
                            socket_id: change.socket_id,
                            is_co_host: change.is_co_host,
                            participants: change.participants,
                        },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::SpotlightParticipant {
            participant_socket_id,
            is_spotlighted,
        } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state.meetings.set_spotlight(
                &meeting_id,
                socket_id,
                &participant_socket_id,
                is_spotlighted,
            ) {
                Ok((target, spotlighted)) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::SpotlightChanged {
                            socket_id: target,
                            is_spotlighted: spotlighted,
                        },
                    )
                    .await;
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::RequestRecordingPermission { display_name } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state
                .meetings
                .request_recording(&meeting_id, socket_id, &display_name)
            {
                Ok(RecordingAsk::Queued {
                    request,
                    pending_count,
                    host_socket_id,
                }) => {
                    if let Some(host) = host_socket_id {
                        dispatcher::send_to_socket(
                            &state.ws_storage,
                            &host,
                            &ServerEvent::RecordingPermissionRequested {
                                request,
                                pending_count,
                            },
                        )
                        .await;
                    }
                }
                Ok(RecordingAsk::Suppressed) => {
                    debug!(%socket_id, %meeting_id, "recording request dropped (suppressed)");
                }
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::RespondRecordingRequest { request_id, approve } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            match state
                .meetings
                .respond_recording(&meeting_id, socket_id, &request_id, approve)
            {
                Ok(Some(RecordingReply::Approved {
                    permission,
                    changed_by,
                })) => {
                    broadcast_to_meeting(
                        state,
                        &meeting_id,
                        &ServerEvent::RecordingPermissionChanged {
                            permission,
                            changed_by,
                        },
                    )
                    .await;
                }
                Ok(Some(RecordingReply::Denied {
                    request_id,
                    requester_socket_id,
                })) => {
                    dispatcher::send_to_socket(
                        &state.ws_storage,
                        &requester_socket_id,
                        &ServerEvent::RecordingRequestDenied { request_id },
                    )
                    .await;
                }
                Ok(None) => {}
                Err(e) => report(state, socket_id, e).await,
            }
        }
        ClientEvent::SuppressRecordingRequests { suppressed } => {
            let Some(meeting_id) = current_meeting(state, socket_id).await else {
                return;
            };
            if let Err(e) = state
                .meetings
                .set_suppress_recording(&meeting_id, socket_id, suppressed)
            {
                report(state, socket_id, e).await;
            }
        }
        ClientEvent::LeaveMeeting => {
            notify_departure(state, socket_id).await;
        }
    }
}

/// Tells the joining socket it is in (with a full snapshot) and announces the
/// arrival to the rest of the room. `from_waiting` selects which event the
/// joiner receives.
async fn announce_joined(state: &AppState, joined: &JoinedMeeting, from_waiting: bool) {
    let to_joiner = if from_waiting {
        ServerEvent::WaitingRoomAdmitted {
            meeting_id: joined.meeting_id.clone(),
            socket_id: joined.participant.socket_id.clone(),
            participants: joined.participants.clone(),
            permissions: joined.permissions.clone(),
            is_locked: joined.is_locked,
            recording_permission: joined.recording_permission,
        }
    } else {
        ServerEvent::MeetingJoined {
            meeting_id: joined.meeting_id.clone(),
            socket_id: joined.participant.socket_id.clone(),
            participants: joined.participants.clone(),
            permissions: joined.permissions.clone(),
            is_locked: joined.is_locked,
            recording_permission: joined.recording_permission,
        }
    };
    dispatcher::send_to_socket(&state.ws_storage, &joined.participant.socket_id, &to_joiner)
        .await;

    let others: Vec<String> = state
        .meetings
        .member_socket_ids(&joined.meeting_id)
        .into_iter()
        .filter(|sid| sid != &joined.participant.socket_id)
        .collect();
    if !others.is_empty() {
        dispatcher::broadcast(
            &state.ws_storage,
            &others,
            &ServerEvent::ParticipantJoined {
                participant: joined.participant.clone(),
                participants: joined.participants.clone(),
            },
        )
        .await;
    }
}

async fn rename(state: &AppState, socket_id: &str, new_name: &str, host_path: bool) {
    let Some(meeting_id) = current_meeting(state, socket_id).await else {
        return;
    };
    match state.meetings.rename(&meeting_id, socket_id, new_name, host_path) {
        Ok(outcome) => {
            broadcast_to_meeting(
                state,
                &meeting_id,
                &ServerEvent::ParticipantRenamed {
                    socket_id: outcome.socket_id,
                    old_name: outcome.old_name,
                    new_name: outcome.new_name,
                    participants: outcome.participants,
                },
            )
            .await;
        }
        Err(e) => report(state, socket_id, e).await,
    }
}

async fn set_hand(state: &AppState, socket_id: &str, raised: bool) {
    let Some(meeting_id) = current_meeting(state, socket_id).await else {
        return;
    };
    match state.meetings.set_hand_raised(&meeting_id, socket_id, raised) {
        Ok((sid, is_hand_raised)) => {
            broadcast_to_meeting(
                state,
                &meeting_id,
                &ServerEvent::HandRaiseChanged {
                    socket_id: sid,
                    is_hand_raised,
                },
            )
            .await;
        }
        Err(e) => report(state, socket_id, e).await,
    }
}

/// Resolves the meeting the socket belongs to, answering with an error event
/// when it is not in one.
async fn current_meeting(state: &AppState, socket_id: &str) -> Option<String> {
    match state.meetings.meeting_id_of(socket_id) {
        Some(id) => Some(id),
        None => {
            action_error(
                state,
                socket_id,
                "not-in-meeting",
                "this connection has not joined a meeting",
            )
            .await;
            None
        }
    }
}

async fn broadcast_to_meeting(state: &AppState, meeting_id: &str, event: &ServerEvent) {
    let members = state.meetings.member_socket_ids(meeting_id);
    dispatcher::broadcast(&state.ws_storage, &members, event).await;
}

async fn report(state: &AppState, socket_id: &str, err: MeetingError) {
    action_error(state, socket_id, err.code(), &err.to_string()).await;
}

async fn action_error(state: &AppState, socket_id: &str, code: &str, message: &str) {
    dispatcher::send_to_socket(
        &state.ws_storage,
        socket_id,
        &ServerEvent::ActionError {
            code: code.to_string(),
            message: message.to_string(),
        },
    )
    .await;
}

/// Shared by explicit leave and disconnect: pulls the socket out of its
/// meeting and tells whoever needs to know.
async fn notify_departure(state: &AppState, socket_id: &str) {
    match state.meetings.disconnect(socket_id) {
        Some(DisconnectOutcome::LeftMeeting {
            meeting_id,
            socket_id,
            name,
            was_host: _,
            participants,
        }) => {
            let remaining = state.meetings.member_socket_ids(&meeting_id);
            if !remaining.is_empty() {
                dispatcher::broadcast(
                    &state.ws_storage,
                    &remaining,
                    &ServerEvent::ParticipantLeft {
                        socket_id,
                        name,
                        participants,
                    },
                )
                .await;
            }
        }
        Some(DisconnectOutcome::LeftWaiting {
            meeting_id: _,
            waiting_count,
            host_socket_id,
        }) => {
            if let Some(host) = host_socket_id {
                dispatcher::send_to_socket(
                    &state.ws_storage,
                    &host,
                    &ServerEvent::WaitingRoomLeft { waiting_count },
                )
                .await;
            }
        }
        None => {}
    }
}
