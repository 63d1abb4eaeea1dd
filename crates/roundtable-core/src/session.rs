//! Per-discussion scheduling state.

use serde::{Deserialize, Serialize};

use crate::discussion::{DiscussionMode, PhaseChange, Turn};
use crate::phase::{self, Phase, Transition};

/// Scheduling state of one running discussion.
///
/// Only the discussion's own scheduler mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    /// Position inside a round-robin phase
    pub turn_counter: usize,
    /// One-shot override set by a mention
    pub forced_speaker_id: Option<String>,
    /// A generation is in flight
    pub busy: bool,
    /// Bumped on every reset; generations started under an older epoch are stale
    pub epoch: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Intro,
            turn_counter: 0,
            forced_speaker_id: None,
            busy: false,
            epoch: 0,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to `transition`, reporting the phase change if there was one.
    pub fn apply(&mut self, transition: Transition) -> Option<PhaseChange> {
        let from = self.phase;
        self.phase = transition.phase;
        self.turn_counter = transition.turn_counter;
        (from != transition.phase).then_some(PhaseChange {
            from,
            to: transition.phase,
        })
    }

    /// Back to the starting position of `mode` under a new epoch.
    pub fn reset(&mut self, mode: DiscussionMode) {
        self.phase = Phase::after_reset(mode);
        self.turn_counter = 0;
        self.forced_speaker_id = None;
        self.busy = false;
        self.epoch += 1;
    }

    /// Rebuilds the position reached by `turns` by replaying them through
    /// the phase machine.
    ///
    /// Mention answers are skipped; user turns apply the interrupt rule.
    pub fn restore(mode: DiscussionMode, roster_len: usize, turns: &[Turn]) -> Self {
        let mut state = Self::new();
        for turn in turns {
            if turn.speaker.is_user() {
                if let Some(t) = phase::after_user_turn(mode, &state) {
                    state.apply(t);
                }
                continue;
            }
            if turn.sidebar || turn.role.is_none() || turn.speaker.participant_id().is_none() {
                continue;
            }
            if let Some(t) = phase::settle(mode, &state) {
                state.apply(t);
            }
            let t = phase::after_turn(mode, &state, roster_len);
            state.apply(t);
        }
        state
    }
}
