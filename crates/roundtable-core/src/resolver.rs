//! Turn resolution: who speaks next and in which role.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::discussion::{DiscussionLog, DiscussionMode};
use crate::participant::Participant;
use crate::phase::Dispatch;
use crate::role::RoleLabel;
use crate::session::SessionState;

/// The resolver's answer for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub participant: &'a Participant,
    pub role: RoleLabel,
    /// Chosen because of a mention. The turn is a sidebar and does not
    /// advance the phase; the caller clears the override.
    pub forced: bool,
}

/// Picks the next speaker.
///
/// Priority: a forced speaker that is on the roster, then the phase's
/// dispatch rule. Returns `None` for an empty roster or a phase that
/// dispatches nobody.
pub fn resolve_next_speaker<'a, R: Rng + ?Sized>(
    mode: DiscussionMode,
    state: &SessionState,
    roster: &'a [Participant],
    log: &DiscussionLog,
    rng: &mut R,
) -> Option<Resolution<'a>> {
    if roster.is_empty() {
        return None;
    }

    if let Some(forced_id) = state.forced_speaker_id.as_deref() {
        if let Some(participant) = roster.iter().find(|p| p.id == forced_id) {
            return Some(Resolution {
                participant,
                role: RoleLabel::Debate,
                forced: true,
            });
        }
        tracing::debug!("Forced speaker '{}' is not on the roster, ignoring", forced_id);
    }

    let (participant, role) = match state.phase.rule(mode).dispatch {
        Dispatch::Nobody => return None,
        Dispatch::Slot { index, role } => (&roster[index % roster.len()], role),
        Dispatch::RoundRobin { role } => (&roster[state.turn_counter % roster.len()], role),
        Dispatch::Open { role } => (pick_debater(roster, log, rng)?, role),
    };

    Some(Resolution {
        participant,
        role,
        forced: false,
    })
}

/// Uniform pick that skips whoever spoke last, unless nobody else is left.
fn pick_debater<'a, R: Rng + ?Sized>(
    roster: &'a [Participant],
    log: &DiscussionLog,
    rng: &mut R,
) -> Option<&'a Participant> {
    let last_speaker = log.last().and_then(|t| t.speaker.participant_id());
    let eligible: Vec<&Participant> = roster
        .iter()
        .filter(|p| Some(p.id.as_str()) != last_speaker)
        .collect();

    if eligible.is_empty() {
        return roster.choose(rng);
    }
    eligible.choose(rng).copied()
}
