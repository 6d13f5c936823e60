use axum::{Json, extract::{Query, State}};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, ws::dispatcher};
use huddle_protocol::{RecordingPermission, ServerEvent};
use huddle_services::meeting::registry::{RecordingAsk, RecordingReply};

#[derive(Debug, Deserialize)]
pub struct RecordingParams {
    pub meeting_id: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission: RecordingPermission,
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionRequest {
    pub meeting_id: String,
    pub socket_id: String,
    pub permission: RecordingPermission,
}

#[derive(Debug, Deserialize)]
pub struct RequestPermissionRequest {
    pub meeting_id: String,
    pub socket_id: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestPermissionResponse {
    Queued { request_id: String },
    Suppressed,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequestRequest {
    pub meeting_id: String,
    pub socket_id: String,
    pub request_id: String,
    pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct RespondRequestResponse {
    pub answered: bool,
}

pub async fn get_permission(
    State(state): State<AppState>,
    Query(params): Query<RecordingParams>,
) -> Result<Json<PermissionResponse>, ApiError> {
    let permission = state.meetings.recording_permission(&params.meeting_id)?;
    Ok(Json(PermissionResponse { permission }))
}

pub async fn set_permission(
    State(state): State<AppState>,
    Json(body): Json<SetPermissionRequest>,
) -> Result<Json<PermissionResponse>, ApiError> {
    let change = state.meetings.set_recording_permission(
        &body.meeting_id,
        &body.socket_id,
        body.permission,
    )?;

    // The socket replicas learn about the change the same way as on the
    // socket path.
    let members = state.meetings.member_socket_ids(&body.meeting_id);
    dispatcher::broadcast(
        &state.ws_storage,
        &members,
        &ServerEvent::RecordingPermissionChanged {
            permission: change.permission,
            changed_by: change.changed_by,
        },
    )
    .await;

    Ok(Json(PermissionResponse {
        permission: change.permission,
    }))
}

pub async fn request_permission(
    State(state): State<AppState>,
    Json(body): Json<RequestPermissionRequest>,
) -> Result<Json<RequestPermissionResponse>, ApiError> {
    let ask = state.meetings.request_recording(
        &body.meeting_id,
        &body.socket_id,
        &body.display_name,
    )?;

    match ask {
        RecordingAsk::Queued {
            request,
            pending_count,
            host_socket_id,
        } => {
            let request_id = request.request_id.clone();
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
            Ok(Json(RequestPermissionResponse::Queued { request_id }))
        }
        RecordingAsk::Suppressed => Ok(Json(RequestPermissionResponse::Suppressed)),
    }
}

pub async fn respond_request(
    State(state): State<AppState>,
    Json(body): Json<RespondRequestRequest>,
) -> Result<Json<RespondRequestResponse>, ApiError> {
    let reply = state.meetings.respond_recording(
        &body.meeting_id,
        &body.socket_id,
        &body.request_id,
        body.approve,
    )?;

    match reply {
        Some(RecordingReply::Approved {
            permission,
            changed_by,
        }) => {
            let members = state.meetings.member_socket_ids(&body.meeting_id);
            dispatcher::broadcast(
                &state.ws_storage,
                &members,
                &ServerEvent::RecordingPermissionChanged {
                    permission,
                    changed_by,
                },
            )
            .await;
            Ok(Json(RespondRequestResponse { answered: true }))
        }
        Some(RecordingReply::Denied {
            request_id,
            requester_socket_id,
        }) => {
            dispatcher::send_to_socket(
                &state.ws_storage,
                &requester_socket_id,
                &ServerEvent::RecordingRequestDenied { request_id },
            )
            .await;
            Ok(Json(RespondRequestResponse { answered: true }))
        }
        None => Ok(Json(RespondRequestResponse { answered: false })),
    }
}
