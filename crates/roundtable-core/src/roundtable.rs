//! The scheduling core of one discussion.
//!
//! [`Roundtable`] owns the roster, the log and the session state, and
//! exposes the operations a scheduler drives it with: `tick`,
//! `complete_generation`, `accept_user_turn` and `reset`. Everything here is
//! synchronous; the only suspension point (the model call) happens outside,
//! between `tick` returning [`TickOutcome::Generate`] and the matching
//! `complete_generation`.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::discussion::{
    Discussion, DiscussionLog, DiscussionMode, PhaseChange, Speaker, Turn, TurnDraft,
};
use crate::mention;
use crate::participant::Participant;
use crate::phase::{self, Phase};
use crate::phrase;
use crate::resolver::resolve_next_speaker;
use crate::role::{RoleLabel, host_opening_line};
use crate::session::SessionState;

/// Default number of recent turns handed to a generation.
pub const DEFAULT_HISTORY_WINDOW: usize = 15;

/// Identifies one dispatched generation.
///
/// A result is only accepted while its ticket is the one in flight; a reset
/// moves to a new epoch, so results from before it are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationTicket {
    pub epoch: u64,
    pub sequence: u64,
}

/// Everything needed to produce a model-backed reply outside the core.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub ticket: GenerationTicket,
    pub participant: Participant,
    pub role: RoleLabel,
    pub mode: DiscussionMode,
    pub topic: String,
    /// Most recent turns, oldest first
    pub history: Vec<Turn>,
}

/// The text a generation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
    /// `text` is an error notice rather than a reply
    pub failed: bool,
}

impl GeneratedReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: false,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// A generation is in flight; nothing happened.
    Busy,
    /// Zero-turn phase transition.
    Advanced(PhaseChange),
    /// A scripted participant spoke.
    Spoke {
        turn: Turn,
        phase_change: Option<PhaseChange>,
    },
    /// A generative participant was dispatched; the caller must run the
    /// request and report back through `complete_generation`.
    Generate(GenerationRequest),
    /// Nobody can be dispatched until a reset or a mention.
    Halted { phase: Phase },
}

#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Appended {
        turn: Turn,
        phase_change: Option<PhaseChange>,
    },
    /// The result belongs to a generation that is no longer current.
    Stale,
}

#[derive(Debug, Clone)]
pub struct UserTurnOutcome {
    pub turn: Turn,
    pub phase_change: Option<PhaseChange>,
    /// Participant the message addressed, now queued to answer next
    pub forced_speaker: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub opening: Turn,
    pub phase: Phase,
    pub epoch: u64,
}

#[derive(Debug, Clone)]
struct PendingGeneration {
    ticket: GenerationTicket,
    speaker: Speaker,
    role: RoleLabel,
    forced: bool,
    /// Phase at dispatch; the result only advances the machine if unchanged
    phase: Phase,
}

pub struct Roundtable {
    id: String,
    topic: String,
    mode: DiscussionMode,
    roster: Vec<Participant>,
    log: DiscussionLog,
    state: SessionState,
    pending: Option<PendingGeneration>,
    next_sequence: u64,
    history_window: usize,
    rng: StdRng,
}

impl Roundtable {
    /// Builds the core for a stored discussion, replaying its turns to
    /// recover the session state.
    pub fn new(discussion: Discussion) -> Self {
        let state = SessionState::restore(discussion.mode, discussion.roster.len(), &discussion.turns);
        Self {
            id: discussion.id,
            topic: discussion.topic,
            mode: discussion.mode,
            roster: discussion.roster,
            log: DiscussionLog::from_turns(discussion.turns),
            state,
            pending: None,
            next_sequence: 0,
            history_window: DEFAULT_HISTORY_WINDOW,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Turns sent with each generation request, unless the speaker's
    /// binding sets its own `context_window`.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mode(&self) -> DiscussionMode {
        self.mode
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn log(&self) -> &DiscussionLog {
        &self.log
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    /// Appends the host's opening line if nothing has been said yet.
    pub fn open(&mut self) -> Option<Turn> {
        if !self.log.is_empty() {
            return None;
        }
        let line = host_opening_line(self.mode, &self.topic);
        Some(self.log.append(TurnDraft::new(Speaker::host(), line)).clone())
    }

    /// Runs one scheduling step.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.busy {
            tracing::debug!(discussion_id = %self.id, "Tick while a generation is in flight, skipping");
            return TickOutcome::Busy;
        }

        let forced_pending = self
            .state
            .forced_speaker_id
            .as_deref()
            .is_some_and(|id| self.roster.iter().any(|p| p.id == id));
        if !forced_pending {
            if let Some(change) =
                phase::settle(self.mode, &self.state).and_then(|t| self.state.apply(t))
            {
                return TickOutcome::Advanced(change);
            }
        }

        let resolution =
            resolve_next_speaker(self.mode, &self.state, &self.roster, &self.log, &mut self.rng)
                .map(|r| (r.participant.clone(), r.role, r.forced));
        // the override is single-use even when it named nobody on the roster
        self.state.forced_speaker_id = None;

        let Some((participant, role, forced)) = resolution else {
            return TickOutcome::Halted {
                phase: self.state.phase,
            };
        };

        tracing::debug!(
            discussion_id = %self.id,
            phase = %self.state.phase,
            speaker = %participant.name,
            role = %role,
            forced,
            "Resolved next speaker"
        );

        if !participant.is_generative() {
            let text = phrase::generate(&participant, &self.topic, &mut self.rng);
            let turn = self
                .log
                .append(
                    TurnDraft::new(Speaker::participant(&participant), text)
                        .with_role(role)
                        .sidebar(forced),
                )
                .clone();
            let phase_change = if forced { None } else { self.advance() };
            return TickOutcome::Spoke { turn, phase_change };
        }

        let window = participant
            .binding()
            .and_then(|b| b.context_window)
            .unwrap_or(self.history_window);
        let ticket = GenerationTicket {
            epoch: self.state.epoch,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.state.busy = true;
        self.pending = Some(PendingGeneration {
            ticket,
            speaker: Speaker::participant(&participant),
            role,
            forced,
            phase: self.state.phase,
        });

        TickOutcome::Generate(GenerationRequest {
            ticket,
            participant,
            role,
            mode: self.mode,
            topic: self.topic.clone(),
            history: self.log.tail(window).to_vec(),
        })
    }

    /// Accepts the result of a dispatched generation.
    ///
    /// Results whose ticket is not the one in flight are dropped.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        reply: GeneratedReply,
    ) -> CompletionOutcome {
        let Some(pending) = self.pending.take_if(|p| p.ticket == ticket) else {
            tracing::debug!(
                discussion_id = %self.id,
                epoch = ticket.epoch,
                current_epoch = self.state.epoch,
                "Dropping stale generation result"
            );
            return CompletionOutcome::Stale;
        };
        self.state.busy = false;

        let turn = self
            .log
            .append(
                TurnDraft::new(pending.speaker, reply.text)
                    .with_role(pending.role)
                    .sidebar(pending.forced)
                    .failed(reply.failed),
            )
            .clone();

        let phase_change = if pending.forced || pending.phase != self.state.phase {
            None
        } else {
            self.advance()
        };
        CompletionOutcome::Appended { turn, phase_change }
    }

    /// Appends a user message and applies the interrupt and mention rules.
    ///
    /// Blank messages are ignored.
    pub fn accept_user_turn(&mut self, text: &str) -> Option<UserTurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let turn = self.log.append(TurnDraft::new(Speaker::user(), text)).clone();
        let phase_change =
            phase::after_user_turn(self.mode, &self.state).and_then(|t| self.state.apply(t));

        let forced_speaker = mention::detect_mention(text, &self.roster).map(|p| p.id.clone());
        if let Some(id) = &forced_speaker {
            self.state.forced_speaker_id = Some(id.clone());
        }

        Some(UserTurnOutcome {
            turn,
            phase_change,
            forced_speaker,
        })
    }

    /// Clears the log and session state, drops any generation in flight and
    /// re-opens the discussion with the host line.
    pub fn reset(&mut self) -> ResetOutcome {
        self.log.clear();
        self.state.reset(self.mode);
        self.pending = None;

        let line = host_opening_line(self.mode, &self.topic);
        let opening = self.log.append(TurnDraft::new(Speaker::host(), line)).clone();
        ResetOutcome {
            opening,
            phase: self.state.phase,
            epoch: self.state.epoch,
        }
    }

    /// `@Name ` draft for a roster member; `None` for unknown names.
    pub fn mention_prefill(&self, name: &str) -> Option<String> {
        mention::mention_prefill(name, &self.roster)
    }

    fn advance(&mut self) -> Option<PhaseChange> {
        let transition = phase::after_turn(self.mode, &self.state, self.roster.len());
        self.state.apply(transition)
    }
}
