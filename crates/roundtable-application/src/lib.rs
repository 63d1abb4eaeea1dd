//! Application layer for Roundtable.
//!
//! Runs discussions: a scheduler task per open discussion, and the use case
//! that creates, loads and deletes discussions over the repositories.

pub mod discussion_usecase;
pub mod runtime_cache;
pub mod scheduler;

pub use discussion_usecase::DiscussionUseCase;
pub use runtime_cache::RuntimeCache;
pub use scheduler::{RuntimeStatus, SchedulerHandle};
