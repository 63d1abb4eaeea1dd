//! OpenAiCompatibleBackend - chat through any `/chat/completions` endpoint.
//!
//! Serves OpenAI itself and every provider that mirrors its API
//! (DeepSeek, Moonshot, Zhipu, Bailian/Qwen).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::participant::{ModelBinding, ModelProvider};
use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize_reply;

#[derive(Clone, Default)]
pub struct OpenAiCompatibleBackend {
    client: Client,
}

impl OpenAiCompatibleBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Models offered for `provider`. These providers are not queried; the
    /// list is static so no key is needed to browse it.
    pub fn list_models(&self, provider: ModelProvider) -> Vec<String> {
        provider
            .suggested_models()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    /// Connection test: the read-only `/models` endpoint first, then a
    /// one-token completion.
    pub async fn probe(&self, binding: &ModelBinding) -> bool {
        let Some(api_key) = binding.api_key() else {
            return false;
        };
        let base = binding.resolved_endpoint();

        match self
            .client
            .get(format!("{}/models", base))
            .bearer_auth(api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => return true,
            Ok(response) => {
                tracing::debug!("Models endpoint answered {}, trying a completion", response.status())
            }
            Err(err) => tracing::debug!("Models endpoint failed: {}, trying a completion", err),
        }

        let request = ChatCompletionRequest {
            model: &binding.model,
            messages: vec![ChatMessage::user("Hi")],
            temperature: None,
            max_tokens: Some(1),
            stream: false,
        };
        match self
            .client
            .post(format!("{}/chat/completions", base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::info!("Connection test for {} failed: {}", binding.provider, err);
                false
            }
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn chat(
        &self,
        binding: &ModelBinding,
        transcript: &[ChatMessage],
    ) -> Result<String, BackendError> {
        let api_key = binding
            .api_key()
            .ok_or_else(|| BackendError::MissingCredentials {
                provider: binding.provider.to_string(),
            })?;

        let request = ChatCompletionRequest {
            model: &binding.model,
            messages: crate::with_system_prompt(binding, transcript),
            temperature: Some(binding.temperature),
            max_tokens: None,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", binding.resolved_endpoint()))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                BackendError::Network(format!("{} request failed: {err}", binding.provider))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            BackendError::MalformedResponse(format!("Failed to parse {} response: {err}", binding.provider))
        })?;

        let content = extract_text_response(parsed)?;
        // reasoning models wrap their chain of thought in <think> tags
        Ok(sanitize_reply(&content, ""))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, BackendError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BackendError::MalformedResponse("no content in the response".to_string()))
}

fn map_http_error(status: StatusCode, body: String) -> BackendError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| {
            format!(
                "API Error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
        });
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}
