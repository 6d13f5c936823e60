pub mod events;
pub mod model;

pub use events::{ClientEvent, ServerEvent};
pub use model::*;
