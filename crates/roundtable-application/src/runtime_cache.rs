use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::scheduler::SchedulerHandle;

/// Running discussions, keyed by discussion id.
#[derive(Clone, Default)]
pub struct RuntimeCache {
    runtimes: Arc<RwLock<HashMap<String, SchedulerHandle>>>,
}

impl RuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, discussion_id: &str) -> Option<SchedulerHandle> {
        let runtimes = self.runtimes.read().await;
        runtimes.get(discussion_id).cloned()
    }

    /// Inserts `handle` unless a runtime is already cached for its
    /// discussion; returns whichever one is cached afterwards.
    pub async fn get_or_insert(&self, handle: SchedulerHandle) -> SchedulerHandle {
        let mut runtimes = self.runtimes.write().await;
        runtimes
            .entry(handle.discussion_id().to_string())
            .or_insert(handle)
            .clone()
    }

    pub async fn remove(&self, discussion_id: &str) -> Option<SchedulerHandle> {
        let mut runtimes = self.runtimes.write().await;
        runtimes.remove(discussion_id)
    }

    /// Empties the cache, returning what was in it.
    pub async fn drain(&self) -> Vec<SchedulerHandle> {
        let mut runtimes = self.runtimes.write().await;
        runtimes.drain().map(|(_, handle)| handle).collect()
    }

    pub async fn len(&self) -> usize {
        self.runtimes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runtimes.read().await.is_empty()
    }
}
