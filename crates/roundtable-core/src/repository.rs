//! Repository traits, re-exported for convenience.

pub use crate::discussion::DiscussionRepository;
pub use crate::participant::CharacterRepository;
