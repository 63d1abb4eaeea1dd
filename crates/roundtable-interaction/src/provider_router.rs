//! Routes each binding to the backend family that serves its provider.

use async_trait::async_trait;
use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::participant::{ModelBinding, ModelProvider};

use crate::{OllamaBackend, OpenAiCompatibleBackend};

/// The backend used by the application: Ollama bindings go to
/// [`OllamaBackend`], everything else to [`OpenAiCompatibleBackend`].
#[derive(Clone, Default)]
pub struct ProviderRouter {
    ollama: OllamaBackend,
    openai: OpenAiCompatibleBackend,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backends(ollama: OllamaBackend, openai: OpenAiCompatibleBackend) -> Self {
        Self { ollama, openai }
    }

    /// Connection test for a binding. Never fails; unreachable is `false`.
    pub async fn probe(&self, binding: &ModelBinding) -> bool {
        if binding.provider.is_openai_compatible() {
            self.openai.probe(binding).await
        } else {
            self.ollama.probe(binding).await
        }
    }

    /// Models available for `provider`. Ollama is asked directly; a failure
    /// there yields an empty list.
    pub async fn list_models(&self, provider: ModelProvider, endpoint: Option<&str>) -> Vec<String> {
        if provider.is_openai_compatible() {
            return self.openai.list_models(provider);
        }
        let endpoint = endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| provider.default_endpoint());
        match self.ollama.list_models(endpoint).await {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!("Failed to fetch Ollama models from {}: {}", endpoint, err);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ModelBackend for ProviderRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn chat(
        &self,
        binding: &ModelBinding,
        transcript: &[ChatMessage],
    ) -> Result<String, BackendError> {
        tracing::debug!(provider = %binding.provider, model = %binding.model, "Routing chat request");
        if binding.provider.is_openai_compatible() {
            self.openai.chat(binding, transcript).await
        } else {
            self.ollama.chat(binding, transcript).await
        }
    }
}
