use serde::{Deserialize, Serialize};

use super::turn::Turn;
use crate::phase::Phase;

/// A phase transition that happened while handling one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// Events a running discussion publishes to its observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundtableEvent {
    TurnAppended { turn: Turn },
    PhaseChanged { change: PhaseChange },
    /// A model-backed participant started generating.
    ThinkingStarted {
        participant_id: String,
        participant_name: String,
    },
    ThinkingFinished { participant_id: String },
    /// The log was cleared; the new opening line follows as `TurnAppended`.
    DiscussionReset { epoch: u64 },
    /// Autonomous scheduling stopped for good (terminal phase or empty roster).
    Halted { phase: Phase },
}
