//! Selection lifecycle and resource ownership.

/// The editing session.
pub mod meme_session;
/// Tracked, revocable image resources.
pub mod resource;
/// Selection state, tickets and commit outcomes.
pub mod selection;

pub use meme_session::Session;
pub use resource::{AcquiredResource, ResourceTracker};
pub use selection::{CommitOutcome, Failure, Selection, SelectionState, SelectionTicket};
