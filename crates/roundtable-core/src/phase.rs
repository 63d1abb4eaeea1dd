//! Discussion phases and the transition table.
//!
//! Each phase maps to a [`PhaseRule`]: who (if anyone) is dispatched while
//! the machine is in that phase, and how it moves on. The functions below
//! are pure; they read a [`SessionState`] and return the position the
//! caller should move to.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::discussion::DiscussionMode;
use crate::role::RoleLabel;
use crate::session::SessionState;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Intro,
    RoundRobin,
    Debate,
    #[serde(rename = "opinion_pioneer")]
    #[strum(serialize = "opinion_pioneer")]
    Pioneer,
    #[serde(rename = "opinion_rational")]
    #[strum(serialize = "opinion_rational")]
    Rationalist,
    #[serde(rename = "opinion_realist")]
    #[strum(serialize = "opinion_realist")]
    Realist,
    #[serde(rename = "opinion_converger")]
    #[strum(serialize = "opinion_converger")]
    Converger,
    #[serde(rename = "opinion_statements")]
    #[strum(serialize = "opinion_statements")]
    Statements,
    #[serde(rename = "opinion_summary")]
    #[strum(serialize = "opinion_summary")]
    Summary,
}

/// Who speaks while the machine sits in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No turn is dispatched.
    Nobody,
    /// The roster member at `index` (modulo roster size).
    Slot { index: usize, role: RoleLabel },
    /// Roster members in order, indexed by the turn counter.
    RoundRobin { role: RoleLabel },
    /// Anyone but the previous speaker, picked at random.
    Open { role: RoleLabel },
}

/// How a phase hands over to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Zero-turn transition on the next tick.
    Immediately(Phase),
    /// After one dispatched turn.
    AfterTurn(Phase),
    /// After every roster member spoke once.
    AfterRound(Phase),
    /// Steady state; only a reset leaves it.
    Stay,
    /// Terminal; autonomous scheduling ends.
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRule {
    pub dispatch: Dispatch,
    pub advance: Advance,
}

impl Phase {
    pub fn rule(self, mode: DiscussionMode) -> PhaseRule {
        let (dispatch, advance) = match self {
            Phase::Intro => (
                Dispatch::Nobody,
                Advance::Immediately(if mode.is_opinion() {
                    Phase::Pioneer
                } else {
                    Phase::RoundRobin
                }),
            ),
            Phase::RoundRobin => (
                Dispatch::RoundRobin {
                    role: RoleLabel::Opening,
                },
                Advance::AfterRound(Phase::Debate),
            ),
            Phase::Debate => (
                Dispatch::Open {
                    role: RoleLabel::Debate,
                },
                Advance::Stay,
            ),
            Phase::Pioneer => (
                Dispatch::Slot {
                    index: 0,
                    role: RoleLabel::Pioneer,
                },
                Advance::AfterTurn(Phase::Rationalist),
            ),
            Phase::Rationalist => (
                Dispatch::Slot {
                    index: 1,
                    role: RoleLabel::Rationalist,
                },
                Advance::AfterTurn(Phase::Realist),
            ),
            Phase::Realist => (
                Dispatch::Slot {
                    index: 2,
                    role: RoleLabel::Realist,
                },
                Advance::AfterTurn(Phase::Converger),
            ),
            Phase::Converger => (
                Dispatch::Slot {
                    index: 3,
                    role: RoleLabel::Converger,
                },
                Advance::AfterTurn(Phase::Statements),
            ),
            Phase::Statements => (
                Dispatch::RoundRobin {
                    role: RoleLabel::Statement,
                },
                Advance::AfterRound(Phase::Summary),
            ),
            Phase::Summary => (Dispatch::Nobody, Advance::Halt),
        };
        PhaseRule { dispatch, advance }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Summary)
    }

    /// Phase entered by an explicit reset.
    pub fn after_reset(mode: DiscussionMode) -> Phase {
        if mode.is_opinion() {
            Phase::Pioneer
        } else {
            Phase::Intro
        }
    }
}

/// A position in the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub turn_counter: usize,
}

/// Zero-turn transition due on the next tick, if any.
pub fn settle(mode: DiscussionMode, state: &SessionState) -> Option<Transition> {
    match state.phase.rule(mode).advance {
        Advance::Immediately(next) => Some(Transition {
            phase: next,
            turn_counter: 0,
        }),
        _ => None,
    }
}

/// Position after one non-sidebar turn was taken in the current phase.
pub fn after_turn(mode: DiscussionMode, state: &SessionState, roster_len: usize) -> Transition {
    let stay = Transition {
        phase: state.phase,
        turn_counter: state.turn_counter,
    };
    match state.phase.rule(mode).advance {
        Advance::AfterTurn(next) => Transition {
            phase: next,
            turn_counter: 0,
        },
        Advance::AfterRound(next) => {
            let counter = state.turn_counter + 1;
            if counter >= roster_len {
                Transition {
                    phase: next,
                    turn_counter: 0,
                }
            } else {
                Transition {
                    phase: state.phase,
                    turn_counter: counter,
                }
            }
        }
        Advance::Immediately(_) | Advance::Stay | Advance::Halt => stay,
    }
}

/// A user turn during intro or round robin jumps straight to debate in the
/// default mode family. Opinion mode never changes phase on user input.
pub fn after_user_turn(mode: DiscussionMode, state: &SessionState) -> Option<Transition> {
    if mode.is_opinion() {
        return None;
    }
    match state.phase {
        Phase::Intro | Phase::RoundRobin => Some(Transition {
            phase: Phase::Debate,
            turn_counter: 0,
        }),
        _ => None,
    }
}
