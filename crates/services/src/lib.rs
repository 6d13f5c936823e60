pub mod error;
pub mod meeting;

pub use error::{MeetingError, MeetingResult};
pub use meeting::registry::MeetingRegistry;
