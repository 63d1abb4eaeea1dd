//! OllamaBackend - chat through a local Ollama daemon.
//!
//! Uses the non-streaming `/api/chat` endpoint and `/api/tags` for the
//! model catalogue.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::participant::ModelBinding;
use serde::{Deserialize, Serialize};

#[derive(Clone, Default)]
pub struct OllamaBackend {
    client: Client,
}

impl OllamaBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Names of the models installed on the daemon at `endpoint`.
    pub async fn list_models(&self, endpoint: &str) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/api/tags", endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| BackendError::Network(format!("Ollama request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|err| BackendError::MalformedResponse(format!("Failed to parse Ollama tags: {err}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// `true` when the daemon answers its tags endpoint.
    pub async fn probe(&self, binding: &ModelBinding) -> bool {
        match self.list_models(&binding.resolved_endpoint()).await {
            Ok(_) => true,
            Err(err) => {
                tracing::info!("Ollama probe failed: {}", err);
                false
            }
        }
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(
        &self,
        binding: &ModelBinding,
        transcript: &[ChatMessage],
    ) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", binding.resolved_endpoint());
        let request = OllamaChatRequest {
            model: &binding.model,
            messages: crate::with_system_prompt(binding, transcript),
            stream: false,
            options: OllamaOptions {
                temperature: binding.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| BackendError::Network(format!("Ollama request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|err| BackendError::MalformedResponse(format!("Failed to parse Ollama response: {err}")))?;

        Ok(parsed.message.content)
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn map_http_error(status: StatusCode, body: String) -> BackendError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}
