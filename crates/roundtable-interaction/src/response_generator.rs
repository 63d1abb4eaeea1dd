//! Turns a generation request into a reply text.
//!
//! The generator never fails: a missing binding, a backend error or a
//! timeout all come back as a failed [`GeneratedReply`] whose text explains
//! what went wrong, so the discussion keeps moving.

use std::sync::Arc;
use std::time::Duration;

use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::config::RoundtableConfig;
use roundtable_core::discussion::{DiscussionMode, Turn};
use roundtable_core::participant::Participant;
use roundtable_core::role::{OUTPUT_FORMAT_RULES, RoleLabel};
use roundtable_core::roundtable::{GeneratedReply, GenerationRequest};

use crate::sanitize::sanitize_reply;

pub struct ResponseGenerator {
    backend: Arc<dyn ModelBackend>,
    context_window: usize,
    timeout: Duration,
    user_name: String,
}

impl ResponseGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self::from_config(backend, &RoundtableConfig::default())
    }

    pub fn from_config(backend: Arc<dyn ModelBackend>, config: &RoundtableConfig) -> Self {
        Self {
            backend,
            context_window: config.scheduler.context_window,
            timeout: config.scheduler.generation_timeout(),
            user_name: config.display.user_name.clone(),
        }
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// Builds the model request for `participant`: one system entry, then
    /// the most recent turns with the participant's own turns as
    /// `assistant` and everyone else's as `user`.
    ///
    /// Failed turns are left out; they hold error notices, not speech.
    pub fn build_transcript(
        &self,
        participant: &Participant,
        topic: &str,
        mode: DiscussionMode,
        history: &[Turn],
        role: RoleLabel,
    ) -> Vec<ChatMessage> {
        let window = participant
            .binding()
            .and_then(|b| b.context_window)
            .unwrap_or(self.context_window);
        let start = history.len().saturating_sub(window);

        let mut transcript = Vec::with_capacity(history.len() - start + 1);
        transcript.push(ChatMessage::system(self.system_instruction(
            participant,
            topic,
            mode,
            role,
        )));

        for turn in history[start..].iter().filter(|t| !t.failed) {
            if turn.speaker.is_system() {
                transcript.push(ChatMessage::user(turn.text.clone()));
                continue;
            }
            let line = format!("{}: {}", turn.speaker.display_name(&self.user_name), turn.text);
            if turn.speaker.participant_id() == Some(participant.id.as_str()) {
                transcript.push(ChatMessage::assistant(line));
            } else {
                transcript.push(ChatMessage::user(line));
            }
        }
        transcript
    }

    fn system_instruction(
        &self,
        participant: &Participant,
        topic: &str,
        mode: DiscussionMode,
        role: RoleLabel,
    ) -> String {
        let mut sections = Vec::with_capacity(4);
        if let Some(prompt) = participant
            .binding()
            .map(|b| b.system_prompt.trim())
            .filter(|p| !p.is_empty())
        {
            sections.push(prompt.to_string());
        }
        sections.push(format!(
            "You are {} in a group discussion. Topic: {}",
            participant.name, topic
        ));
        sections.push(role.instruction(mode, topic, participant.description()));
        sections.push(OUTPUT_FORMAT_RULES.to_string());
        sections.join("\n\n")
    }

    /// Generates a reply for `participant`.
    pub async fn respond(
        &self,
        participant: &Participant,
        topic: &str,
        mode: DiscussionMode,
        history: &[Turn],
        role: RoleLabel,
    ) -> GeneratedReply {
        let Some(binding) = participant.binding() else {
            tracing::warn!(speaker = %participant.name, "Generative participant has no model binding");
            return GeneratedReply::failed(format!(
                "[{} is unavailable: no model is configured]",
                participant.name
            ));
        };

        let transcript = self.build_transcript(participant, topic, mode, history, role);
        let result = match tokio::time::timeout(self.timeout, self.backend.chat(binding, &transcript)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        let result = result.and_then(|raw| {
            let text = sanitize_reply(&raw, &participant.name);
            if text.is_empty() {
                Err(BackendError::MalformedResponse("empty reply".to_string()))
            } else {
                Ok(text)
            }
        });

        match result {
            Ok(text) => GeneratedReply::ok(text),
            Err(err) => {
                tracing::warn!(
                    speaker = %participant.name,
                    provider = %binding.provider,
                    model = %binding.model,
                    backend = self.backend.name(),
                    "Generation failed: {}",
                    err
                );
                GeneratedReply::failed(format!(
                    "[{} could not answer: {} ({}) failed: {}]",
                    participant.name, binding.provider, binding.model, err
                ))
            }
        }
    }

    /// [`respond`](Self::respond) for a request dispatched by the core.
    pub async fn respond_to(&self, request: &GenerationRequest) -> GeneratedReply {
        self.respond(
            &request.participant,
            &request.topic,
            request.mode,
            &request.history,
            request.role,
        )
        .await
    }
}
