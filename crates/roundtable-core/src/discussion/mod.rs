//! Discussion domain module.
//!
//! # Module Structure
//!
//! - `model`: The persisted discussion (`Discussion`, `DiscussionMode`, creation request)
//! - `turn`: Turns, speakers and the append-only `DiscussionLog`
//! - `event`: Events published by a running discussion
//! - `repository`: Repository trait for discussion persistence

mod event;
mod model;
mod repository;
mod turn;

pub use event::{PhaseChange, RoundtableEvent};
pub use model::{CreateDiscussionRequest, Discussion, DiscussionMode, MAX_ROSTER_SIZE};
pub use repository::DiscussionRepository;
pub use turn::{DiscussionLog, SentinelKind, Speaker, Turn, TurnDraft};
