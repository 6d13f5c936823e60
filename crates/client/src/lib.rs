//! Client-side adapter contracts for the meeting feature layer.
//!
//! No UI lives here: the snapshot is the locally cached replica of the
//! server's meeting state, adapters translate user intents into outbound
//! events and route inbound events, and the optimistic layer gives the UI
//! immediate feedback with an explicit rollback path.

pub mod adapter;
pub mod optimistic;
pub mod snapshot;

pub use adapter::FeatureAdapter;
pub use optimistic::OptimisticRoster;
pub use snapshot::{MeetingSnapshot, ReplicaPhase};
