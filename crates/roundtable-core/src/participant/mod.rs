//! Participant domain module.
//!
//! # Module Structure
//!
//! - `model`: Participant models (`Participant`, `ParticipantKind`, `ModelBinding`, `ModelProvider`)
//! - `repository`: Repository trait for custom character persistence
//! - `preset`: Built-in scripted characters

mod model;
mod preset;
mod repository;

pub use model::{
    CharacterSource, DEFAULT_TEMPERATURE, ModelBinding, ModelProvider, Participant,
    ParticipantKind, refresh_roster,
};
pub use preset::builtin_characters;
pub use repository::CharacterRepository;
