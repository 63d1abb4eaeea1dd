//! Model backends and the response generator for generative participants.

pub mod ollama_backend;
pub mod openai_compatible_backend;
pub mod provider_router;
pub mod response_generator;
pub mod sanitize;

pub use ollama_backend::OllamaBackend;
pub use openai_compatible_backend::OpenAiCompatibleBackend;
pub use provider_router::ProviderRouter;
pub use response_generator::ResponseGenerator;

use roundtable_core::backend::{ChatMessage, ChatRole};
use roundtable_core::participant::ModelBinding;

/// Prepends the binding's system prompt unless the transcript already
/// opens with a system message.
pub(crate) fn with_system_prompt(binding: &ModelBinding, transcript: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    let starts_with_system = transcript
        .first()
        .is_some_and(|m| m.role == ChatRole::System);
    if !binding.system_prompt.trim().is_empty() && !starts_with_system {
        messages.push(ChatMessage::system(binding.system_prompt.clone()));
    }
    messages.extend_from_slice(transcript);
    messages
}
