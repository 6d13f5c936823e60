use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use huddle_services::MeetingError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<MeetingError> for ApiError {
    fn from(err: MeetingError) -> Self {
        match err {
            MeetingError::NotFound => ApiError::NotFound("Meeting not found".to_string()),
            MeetingError::ParticipantNotFound => {
                ApiError::NotFound("Participant not found".to_string())
            }
            MeetingError::Forbidden(msg) => ApiError::Forbidden(msg),
            MeetingError::Validation(msg) => ApiError::BadRequest(msg),
            MeetingError::NameTaken(name) => {
                ApiError::Conflict(format!("Name already in use: {name}"))
            }
            MeetingError::NameUnchanged => {
                ApiError::BadRequest("New name matches the current name".to_string())
            }
        }
    }
}
