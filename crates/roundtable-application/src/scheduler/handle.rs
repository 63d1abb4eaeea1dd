use std::sync::Arc;

use anyhow::{Result, anyhow};
use roundtable_core::Roundtable;
use roundtable_core::config::SchedulerConfig;
use roundtable_core::discussion::{DiscussionRepository, RoundtableEvent, Turn};
use roundtable_core::roundtable::{ResetOutcome, UserTurnOutcome};
use roundtable_interaction::ResponseGenerator;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::actor::{Command, Outlets, SchedulerLoop};
use super::persistence::PersistenceWriter;
use super::status::RuntimeStatus;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Cloneable handle to a running discussion.
///
/// Dropping every handle does not stop the task; call [`shutdown`].
///
/// [`shutdown`]: SchedulerHandle::shutdown
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    discussion_id: String,
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<RoundtableEvent>,
    status: watch::Receiver<RuntimeStatus>,
    token: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SchedulerHandle {
    /// Spawns the actor task for `table`. The loop stays idle until `start`.
    pub fn spawn(
        table: Roundtable,
        generator: Arc<ResponseGenerator>,
        repository: Arc<dyn DiscussionRepository>,
        config: SchedulerConfig,
    ) -> Self {
        let discussion_id = table.id().to_string();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (status_tx, status_rx) = watch::channel(RuntimeStatus::of(&table, false));
        let token = CancellationToken::new();

        let persistence = PersistenceWriter::spawn(discussion_id.clone(), repository);
        let actor = SchedulerLoop::new(
            table,
            generator,
            config,
            commands_rx,
            Outlets {
                events: events.clone(),
                status: status_tx,
            },
            persistence,
            token.clone(),
        );
        let task = tokio::spawn(actor.run());

        Self {
            discussion_id,
            commands: commands_tx,
            events,
            status: status_rx,
            token,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    pub fn discussion_id(&self) -> &str {
        &self.discussion_id
    }

    /// Begins autonomous turns after the start delay.
    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    /// Cancels the pending tick. A generation already in flight still lands.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Posts a user message. `None` when the text was blank.
    pub async fn send_user(&self, text: impl Into<String>) -> Result<Option<UserTurnOutcome>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::UserSend {
            text: text.into(),
            reply,
        })
        .await?;
        self.receive(rx).await
    }

    pub async fn reset(&self) -> Result<ResetOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply }).await?;
        self.receive(rx).await
    }

    /// `@Name ` draft for a roster member.
    pub async fn mention_prefill(&self, name: impl Into<String>) -> Result<Option<String>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::MentionPrefill {
            name: name.into(),
            reply,
        })
        .await?;
        self.receive(rx).await
    }

    /// Snapshot of the in-memory log.
    pub async fn turns(&self) -> Result<Vec<Turn>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Turns { reply }).await?;
        self.receive(rx).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundtableEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> RuntimeStatus {
        self.status.borrow().clone()
    }

    pub fn status_receiver(&self) -> watch::Receiver<RuntimeStatus> {
        self.status.clone()
    }

    /// Whether both handles drive the same actor task.
    pub fn is_same_runtime(&self, other: &SchedulerHandle) -> bool {
        Arc::ptr_eq(&self.task, &other.task)
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stops the actor and waits until pending writes are flushed.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(discussion_id = %self.discussion_id, "Scheduler task panicked: {}", e);
            }
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Discussion {} is no longer running", self.discussion_id))
    }

    async fn receive<T>(&self, rx: oneshot::Receiver<T>) -> Result<T> {
        rx.await
            .map_err(|_| anyhow!("Discussion {} stopped before replying", self.discussion_id))
    }
}
