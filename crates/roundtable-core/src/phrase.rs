//! Scripted utterances.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::participant::Participant;

/// Placeholder replaced by the discussion topic.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Spoken when a scripted participant has no phrases.
pub const EMPTY_PHRASE: &str = "...";

/// Picks one of the participant's phrase templates at random and fills in
/// the topic. Never fails.
pub fn generate<R: Rng + ?Sized>(participant: &Participant, topic: &str, rng: &mut R) -> String {
    match participant.phrases().choose(rng) {
        Some(template) => template.replace(TOPIC_PLACEHOLDER, topic),
        None => EMPTY_PHRASE.to_string(),
    }
}
