use axum::{Json, extract::{Query, State}};
use huddle_protocol::ServerEvent;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, ws::dispatcher};

#[derive(Debug, Deserialize)]
pub struct ChatStateParams {
    pub meeting_id: Option<String>,
}

/// Both chat flags, separately named. `global_chat_disabled` is the
/// process-wide kill switch; `meeting_chat_disabled` is scoped to one meeting
/// and is null when no meeting id was given or the meeting does not exist.
#[derive(Debug, Serialize)]
pub struct ChatStateResponse {
    pub global_chat_disabled: bool,
    pub meeting_chat_disabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DisableChatRequest {
    pub meeting_id: Option<String>,
    pub disabled: bool,
    /// Socket id of the caller; required (and gate-checked) for the
    /// meeting-scoped flag.
    pub changed_by: Option<String>,
}

pub async fn chat_state(
    State(state): State<AppState>,
    Query(params): Query<ChatStateParams>,
) -> Json<ChatStateResponse> {
    let chat = state.meetings.chat_state(params.meeting_id.as_deref());
    Json(ChatStateResponse {
        global_chat_disabled: chat.global_chat_disabled,
        meeting_chat_disabled: chat.meeting_chat_disabled,
    })
}

pub async fn disable_chat(
    State(state): State<AppState>,
    Json(body): Json<DisableChatRequest>,
) -> Result<Json<ChatStateResponse>, ApiError> {
    match body.meeting_id {
        Some(ref meeting_id) => {
            let changed_by = body.changed_by.as_deref().ok_or_else(|| {
                ApiError::BadRequest("changed_by is required for a meeting-scoped change".into())
            })?;
            let change = state
                .meetings
                .set_chat_disabled(meeting_id, changed_by, body.disabled)?;

            let members = state.meetings.member_socket_ids(meeting_id);
            dispatcher::broadcast(
                &state.ws_storage,
                &members,
                &ServerEvent::ChatStateChanged {
                    chat_disabled: change.disabled,
                    changed_by: change.changed_by,
                },
            )
            .await;
        }
        None => {
            state
                .meetings
                .set_global_chat_disabled(body.disabled, body.changed_by.clone());
        }
    }

    let chat = state.meetings.chat_state(body.meeting_id.as_deref());
    Ok(Json(ChatStateResponse {
        global_chat_disabled: chat.global_chat_disabled,
        meeting_chat_disabled: chat.meeting_chat_disabled,
    }))
}
