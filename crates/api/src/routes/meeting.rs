use axum::{Json, extract::{Path, State}};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};
use huddle_protocol::{ParticipantSummary, WaitingSummary};

#[derive(Debug, Serialize)]
pub struct CreateMeetingResponse {
    pub meeting_id: String,
    pub join_url: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<ParticipantSummary>,
    pub waiting: Vec<WaitingSummary>,
    pub waiting_count: usize,
    pub is_locked: bool,
}

pub async fn create(State(state): State<AppState>) -> Json<CreateMeetingResponse> {
    let meeting_id = state.meetings.create_meeting();
    let join_url = format!("/join/{meeting_id}");
    Json(CreateMeetingResponse {
        meeting_id,
        join_url,
    })
}

pub async fn participants(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<ParticipantsResponse>, ApiError> {
    let overview = state.meetings.overview(&meeting_id)?;
    let waiting_count = overview.waiting.len();
    Ok(Json(ParticipantsResponse {
        participants: overview.participants,
        waiting: overview.waiting,
        waiting_count,
        is_locked: overview.is_locked,
    }))
}
