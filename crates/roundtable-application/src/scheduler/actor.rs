use std::sync::Arc;
use std::time::Duration;

use roundtable_core::Roundtable;
use roundtable_core::config::SchedulerConfig;
use roundtable_core::discussion::{PhaseChange, RoundtableEvent, Turn};
use roundtable_core::roundtable::{
    CompletionOutcome, GeneratedReply, GenerationRequest, GenerationTicket, ResetOutcome,
    TickOutcome, UserTurnOutcome,
};
use roundtable_interaction::ResponseGenerator;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::persistence::{PersistOp, PersistenceWriter};
use super::status::RuntimeStatus;
use super::timer::DelayedTick;

/// Triggers sent from a [`SchedulerHandle`](super::SchedulerHandle).
#[derive(Debug)]
pub(crate) enum Command {
    Start,
    Stop,
    UserSend {
        text: String,
        reply: oneshot::Sender<Option<UserTurnOutcome>>,
    },
    Reset {
        reply: oneshot::Sender<ResetOutcome>,
    },
    MentionPrefill {
        name: String,
        reply: oneshot::Sender<Option<String>>,
    },
    Turns {
        reply: oneshot::Sender<Vec<Turn>>,
    },
}

/// A finished model call on its way back to the actor.
#[derive(Debug)]
pub(crate) struct Completion {
    ticket: GenerationTicket,
    participant_id: String,
    reply: GeneratedReply,
}

/// Channels the actor publishes on.
pub(crate) struct Outlets {
    pub events: broadcast::Sender<RoundtableEvent>,
    pub status: watch::Sender<RuntimeStatus>,
}

/// The actor task that owns one discussion.
pub(crate) struct SchedulerLoop {
    table: Roundtable,
    generator: Arc<ResponseGenerator>,
    config: SchedulerConfig,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    outlets: Outlets,
    persistence: PersistenceWriter,
    timer: DelayedTick,
    running: bool,
    token: CancellationToken,
}

impl SchedulerLoop {
    pub fn new(
        table: Roundtable,
        generator: Arc<ResponseGenerator>,
        config: SchedulerConfig,
        commands: mpsc::Receiver<Command>,
        outlets: Outlets,
        persistence: PersistenceWriter,
        token: CancellationToken,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            table,
            generator,
            config,
            commands,
            completions_tx,
            completions_rx,
            outlets,
            persistence,
            timer: DelayedTick::default(),
            running: false,
            token,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(discussion_id = %self.table.id(), phase = %self.table.phase(), "Scheduler loop started");
        self.publish_status();

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(done) = self.completions_rx.recv() => self.on_completion(done),
                _ = self.timer.wait() => {
                    self.timer.cancel();
                    self.on_tick();
                }
            }
            self.publish_status();
        }

        self.running = false;
        self.timer.cancel();
        self.publish_status();
        self.persistence.close().await;
        tracing::info!(discussion_id = %self.table.id(), "Scheduler loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::UserSend { text, reply } => {
                let _ = reply.send(self.on_user_send(&text));
            }
            Command::Reset { reply } => {
                let _ = reply.send(self.on_reset());
            }
            Command::MentionPrefill { name, reply } => {
                let _ = reply.send(self.table.mention_prefill(&name));
            }
            Command::Turns { reply } => {
                let _ = reply.send(self.table.log().turns().to_vec());
            }
        }
    }

    fn start(&mut self) {
        if self.timer.is_pending() {
            tracing::debug!(discussion_id = %self.table.id(), "Start while a tick is pending, rescheduling");
        }
        self.running = true;
        self.timer.schedule(self.config.start_delay());
    }

    fn stop(&mut self) {
        self.running = false;
        self.timer.cancel();
    }

    fn on_tick(&mut self) {
        if !self.running {
            return;
        }
        match self.table.tick() {
            TickOutcome::Busy => {}
            TickOutcome::Advanced(change) => {
                self.emit_phase_change(Some(change));
                self.timer.schedule(Duration::ZERO);
            }
            TickOutcome::Spoke { turn, phase_change } => {
                self.record_turn(turn);
                self.emit_phase_change(phase_change);
                self.timer.schedule(self.config.turn_interval());
            }
            TickOutcome::Generate(request) => self.dispatch(request),
            TickOutcome::Halted { phase } => {
                tracing::info!(discussion_id = %self.table.id(), phase = %phase, "Nobody left to speak, halting");
                self.running = false;
                self.emit(RoundtableEvent::Halted { phase });
            }
        }
    }

    fn dispatch(&mut self, request: GenerationRequest) {
        let participant_id = request.participant.id.clone();
        self.emit(RoundtableEvent::ThinkingStarted {
            participant_id: participant_id.clone(),
            participant_name: request.participant.name.clone(),
        });

        let generator = Arc::clone(&self.generator);
        let done = self.completions_tx.clone();
        tokio::spawn(async move {
            let reply = generator.respond_to(&request).await;
            // the actor may have shut down meanwhile
            let _ = done.send(Completion {
                ticket: request.ticket,
                participant_id,
                reply,
            });
        });
    }

    fn on_completion(&mut self, done: Completion) {
        match self.table.complete_generation(done.ticket, done.reply) {
            CompletionOutcome::Appended { turn, phase_change } => {
                self.emit(RoundtableEvent::ThinkingFinished {
                    participant_id: done.participant_id,
                });
                self.record_turn(turn);
                self.emit_phase_change(phase_change);
                if self.running {
                    self.timer.schedule(self.config.turn_interval());
                }
            }
            // a reset already cleared the indicator for this one
            CompletionOutcome::Stale => {}
        }
    }

    fn on_user_send(&mut self, text: &str) -> Option<UserTurnOutcome> {
        let outcome = self.table.accept_user_turn(text)?;
        self.record_turn(outcome.turn.clone());
        self.emit_phase_change(outcome.phase_change);
        if let Some(id) = &outcome.forced_speaker {
            tracing::debug!(discussion_id = %self.table.id(), speaker = %id, "Mention queued");
        }

        self.running = true;
        self.timer.schedule(self.config.user_settle());
        Some(outcome)
    }

    fn on_reset(&mut self) -> ResetOutcome {
        self.timer.cancel();
        let outcome = self.table.reset();
        tracing::info!(discussion_id = %self.table.id(), epoch = outcome.epoch, "Discussion reset");

        self.persistence.submit(PersistOp::Clear);
        self.emit(RoundtableEvent::DiscussionReset {
            epoch: outcome.epoch,
        });
        self.record_turn(outcome.opening.clone());

        self.running = true;
        self.timer.schedule(self.config.reset_settle());
        outcome
    }

    fn record_turn(&self, turn: Turn) {
        self.persistence.submit(PersistOp::Append(turn.clone()));
        self.emit(RoundtableEvent::TurnAppended { turn });
    }

    fn emit_phase_change(&self, change: Option<PhaseChange>) {
        if let Some(change) = change {
            tracing::debug!(discussion_id = %self.table.id(), from = %change.from, to = %change.to, "Phase changed");
            self.emit(RoundtableEvent::PhaseChanged { change });
        }
    }

    fn emit(&self, event: RoundtableEvent) {
        // broadcast::Sender::send only fails when nobody is subscribed
        let _ = self.outlets.events.send(event);
    }

    fn publish_status(&self) {
        self.outlets
            .status
            .send_replace(RuntimeStatus::of(&self.table, self.running));
    }
}
