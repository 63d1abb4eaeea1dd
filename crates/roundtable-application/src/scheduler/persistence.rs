use std::sync::Arc;

use roundtable_core::discussion::{DiscussionRepository, Turn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub(crate) enum PersistOp {
    Append(Turn),
    Clear,
}

/// Applies log changes to the repository in submission order.
///
/// Scheduling never waits on it; failures are logged and the in-memory log
/// stays authoritative.
pub(crate) struct PersistenceWriter {
    tx: mpsc::UnboundedSender<PersistOp>,
    task: JoinHandle<()>,
}

impl PersistenceWriter {
    pub fn spawn(discussion_id: String, repository: Arc<dyn DiscussionRepository>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistOp>();
        let task = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                let result = match &op {
                    PersistOp::Append(turn) => repository.append_turn(&discussion_id, turn).await,
                    PersistOp::Clear => repository.clear_turns(&discussion_id).await,
                };
                if let Err(e) = result {
                    tracing::error!(
                        discussion_id = %discussion_id,
                        "Failed to persist {:?}: {}",
                        op,
                        e
                    );
                }
            }
            tracing::debug!(discussion_id = %discussion_id, "Persistence writer drained");
        });
        Self { tx, task }
    }

    pub fn submit(&self, op: PersistOp) {
        if self.tx.send(op).is_err() {
            tracing::error!("Persistence writer has stopped; dropping write");
        }
    }

    /// Waits until every submitted op has been applied.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!("Persistence writer panicked: {}", e);
        }
    }
}
