use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeetingError {
    #[error("Meeting not found")]
    NotFound,
    #[error("Participant not found")]
    ParticipantNotFound,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Name already in use: {0}")]
    NameTaken(String),
    #[error("New name matches the current name")]
    NameUnchanged,
}

impl MeetingError {
    /// Stable error code carried in `action-error` events and HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            MeetingError::NotFound => "meeting-not-found",
            MeetingError::ParticipantNotFound => "participant-not-found",
            MeetingError::Forbidden(_) => "forbidden",
            MeetingError::Validation(_) => "validation",
            MeetingError::NameTaken(_) => "name-taken",
            MeetingError::NameUnchanged => "name-unchanged",
        }
    }
}

pub type MeetingResult<T> = Result<T, MeetingError>;
