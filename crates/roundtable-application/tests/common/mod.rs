#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::config::RoundtableConfig;
use roundtable_core::discussion::{
    CreateDiscussionRequest, Discussion, DiscussionMode, DiscussionRepository, RoundtableEvent,
    Turn,
};
use roundtable_core::error::{Result, RoundtableError};
use roundtable_core::participant::{
    CharacterRepository, ModelBinding, ModelProvider, Participant,
};
use tokio::sync::{Notify, broadcast};

/// Mock DiscussionRepository for testing.
#[derive(Default)]
pub struct MockDiscussionRepository {
    pub discussions: Mutex<HashMap<String, Discussion>>,
}

impl MockDiscussionRepository {
    pub fn stored(&self, id: &str) -> Option<Discussion> {
        self.discussions.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl DiscussionRepository for MockDiscussionRepository {
    async fn find_by_id(&self, discussion_id: &str) -> Result<Option<Discussion>> {
        Ok(self.stored(discussion_id))
    }

    async fn save(&self, discussion: &Discussion) -> Result<()> {
        self.discussions
            .lock()
            .unwrap()
            .insert(discussion.id.clone(), discussion.clone());
        Ok(())
    }

    async fn delete(&self, discussion_id: &str) -> Result<()> {
        self.discussions.lock().unwrap().remove(discussion_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Discussion>> {
        Ok(self.discussions.lock().unwrap().values().cloned().collect())
    }

    async fn append_turn(&self, discussion_id: &str, turn: &Turn) -> Result<()> {
        match self.discussions.lock().unwrap().get_mut(discussion_id) {
            Some(discussion) => {
                discussion.turns.push(turn.clone());
                Ok(())
            }
            None => Err(RoundtableError::not_found("Discussion", discussion_id)),
        }
    }

    async fn clear_turns(&self, discussion_id: &str) -> Result<()> {
        match self.discussions.lock().unwrap().get_mut(discussion_id) {
            Some(discussion) => {
                discussion.turns.clear();
                Ok(())
            }
            None => Err(RoundtableError::not_found("Discussion", discussion_id)),
        }
    }
}

/// Mock CharacterRepository for testing.
#[derive(Default)]
pub struct MockCharacterRepository {
    pub characters: Mutex<Vec<Participant>>,
}

impl MockCharacterRepository {
    pub fn with(characters: Vec<Participant>) -> Self {
        Self {
            characters: Mutex::new(characters),
        }
    }
}

#[async_trait]
impl CharacterRepository for MockCharacterRepository {
    async fn get_all(&self) -> Result<Vec<Participant>> {
        Ok(self.characters.lock().unwrap().clone())
    }

    async fn save_all(&self, characters: &[Participant]) -> Result<()> {
        *self.characters.lock().unwrap() = characters.to_vec();
        Ok(())
    }
}

/// Replies "reply N" for the N-th call. When gated, each call waits for
/// one `release()`.
pub struct ScriptedBackend {
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    pub models: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn instant() -> Arc<Self> {
        Arc::new(Self {
            gate: None,
            calls: AtomicUsize::new(0),
            models: Mutex::new(Vec::new()),
        })
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Arc::new(Notify::new())),
            calls: AtomicUsize::new(0),
            models: Mutex::new(Vec::new()),
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        binding: &ModelBinding,
        _transcript: &[ChatMessage],
    ) -> std::result::Result<String, BackendError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.models.lock().unwrap().push(binding.model.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(format!("reply {}", n))
    }
}

pub fn scripted(id: &str) -> Participant {
    Participant::scripted(id, id.to_uppercase(), vec![format!("{} says {{topic}}", id)])
}

pub fn generative(id: &str) -> Participant {
    Participant::generative(
        id,
        id.to_uppercase(),
        None,
        Some(ModelBinding::new(ModelProvider::Ollama, "llama3")),
    )
}

/// Long generation timeout so paused-clock tests never hit it.
pub fn test_config() -> RoundtableConfig {
    let mut config = RoundtableConfig::default();
    config.scheduler.generation_timeout_secs = 3600;
    config
}

pub fn discussion(mode: DiscussionMode, roster: Vec<Participant>) -> Discussion {
    CreateDiscussionRequest {
        title: None,
        topic: "X".to_string(),
        mode,
        roster,
    }
    .into_discussion()
    .unwrap()
}

/// Waits for the next event matching `pred`.
pub async fn next_event<F>(
    rx: &mut broadcast::Receiver<RoundtableEvent>,
    mut pred: F,
) -> RoundtableEvent
where
    F: FnMut(&RoundtableEvent) -> bool,
{
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(600), wait)
        .await
        .expect("timed out waiting for event")
}

/// Waits for the next turn spoken by a participant.
pub async fn next_participant_turn(rx: &mut broadcast::Receiver<RoundtableEvent>) -> Turn {
    match next_event(rx, |e| {
        matches!(e, RoundtableEvent::TurnAppended { turn } if turn.speaker.participant_id().is_some())
    })
    .await
    {
        RoundtableEvent::TurnAppended { turn } => turn,
        other => panic!("unexpected event {:?}", other),
    }
}
