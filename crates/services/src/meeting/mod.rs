pub mod registry;
pub mod state;

pub use registry::MeetingRegistry;
pub use state::{Meeting, Participant, RecordingState, WaitingParticipant, WaitingRoom};
