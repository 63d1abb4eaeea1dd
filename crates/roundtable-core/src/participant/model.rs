//! Participant domain model.
//!
//! A participant is either scripted (speaks canned phrases) or generative
//! (asks a model backend for each reply).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Sampling temperature used when a binding does not specify one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Model providers a generative participant can be bound to.
///
/// Every provider except `Ollama` speaks the OpenAI-compatible chat protocol.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModelProvider {
    /// Local Ollama daemon
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    Deepseek,
    Moonshot,
    Zhipu,
    Bailian,
    Qwen,
}

impl ModelProvider {
    /// Endpoint used when the binding leaves `endpoint` empty.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ModelProvider::Ollama => "http://localhost:11434",
            ModelProvider::OpenAi => "https://api.openai.com/v1",
            ModelProvider::Deepseek => "https://api.deepseek.com/v1",
            ModelProvider::Moonshot => "https://api.moonshot.cn/v1",
            ModelProvider::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
            ModelProvider::Bailian | ModelProvider::Qwen => {
                "https://dashscope.aliyuncs.com/compatible-mode/v1"
            }
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        !matches!(self, ModelProvider::Ollama)
    }

    /// Models offered when the provider cannot be asked for its catalogue.
    pub fn suggested_models(&self) -> &'static [&'static str] {
        match self {
            ModelProvider::Ollama => &["llama3", "qwen2.5", "mistral"],
            ModelProvider::OpenAi => &["gpt-3.5-turbo", "gpt-4o", "gpt-4-turbo"],
            ModelProvider::Deepseek => &["deepseek-chat", "deepseek-reasoner"],
            ModelProvider::Moonshot => &["moonshot-v1-8k", "moonshot-v1-32k"],
            ModelProvider::Zhipu => &["glm-4", "glm-4-flash"],
            ModelProvider::Bailian | ModelProvider::Qwen => &["qwen-turbo", "qwen-plus", "qwen-max"],
        }
    }
}

/// Connection details for a generative participant.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct ModelBinding {
    #[serde(default)]
    pub provider: ModelProvider,
    pub model: String,
    /// Base URL; the provider default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Persona prompt prepended to every request
    #[serde(default)]
    pub system_prompt: String,
    /// Overrides the configured history window for this binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<usize>,
}

impl ModelBinding {
    pub fn new(provider: ModelProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            endpoint: None,
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: String::new(),
            context_window: None,
        }
    }

    /// Returns the endpoint with trailing slashes removed and a doubled
    /// `/v1/v1` suffix collapsed.
    pub fn resolved_endpoint(&self) -> String {
        let raw = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.provider.default_endpoint());

        let mut endpoint = raw.trim_end_matches('/').to_string();
        while endpoint.ends_with("/v1/v1") {
            endpoint.truncate(endpoint.len() - "/v1".len());
        }
        endpoint
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBinding")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("context_window", &self.context_window)
            .finish()
    }
}

/// Represents the source of a character (built-in or user-created).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterSource {
    /// Built-in characters shipped with the application
    System,
    /// User-created custom characters
    #[default]
    User,
}

/// How a participant produces its utterances.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Speaks one of its canned phrase templates.
    Scripted {
        #[serde(default)]
        phrases: Vec<String>,
    },
    /// Asks a model backend for each reply.
    Generative {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<ModelBinding>,
    },
}

/// A named character seated at a discussion.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Participant {
    /// Unique identifier; stable across sessions
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    /// Short tagline ("Tech Visionary")
    #[serde(default)]
    pub tag: String,
    /// Accent colour used by front-ends
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub source: CharacterSource,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn scripted(id: impl Into<String>, name: impl Into<String>, phrases: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            tag: String::new(),
            color: String::new(),
            source: CharacterSource::User,
            kind: ParticipantKind::Scripted { phrases },
        }
    }

    pub fn generative(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        binding: Option<ModelBinding>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            tag: String::new(),
            color: String::new(),
            source: CharacterSource::User,
            kind: ParticipantKind::Generative {
                description,
                binding,
            },
        }
    }

    pub fn is_generative(&self) -> bool {
        matches!(self.kind, ParticipantKind::Generative { .. })
    }

    /// Phrase templates; empty for generative participants.
    pub fn phrases(&self) -> &[String] {
        match &self.kind {
            ParticipantKind::Scripted { phrases } => phrases,
            ParticipantKind::Generative { .. } => &[],
        }
    }

    pub fn binding(&self) -> Option<&ModelBinding> {
        match &self.kind {
            ParticipantKind::Generative { binding, .. } => binding.as_ref(),
            ParticipantKind::Scripted { .. } => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            ParticipantKind::Generative { description, .. } => description.as_deref(),
            ParticipantKind::Scripted { .. } => None,
        }
    }
}

/// Replaces the binding and description of every generative roster member
/// that has a canonical definition with the same id.
///
/// Returns the number of participants that changed.
pub fn refresh_roster(roster: &mut [Participant], definitions: &[Participant]) -> usize {
    let mut refreshed = 0;
    for participant in roster.iter_mut().filter(|p| p.is_generative()) {
        let Some(canonical) = definitions
            .iter()
            .find(|d| d.id == participant.id && d.is_generative())
        else {
            continue;
        };
        if participant.kind != canonical.kind {
            participant.kind = canonical.kind.clone();
            refreshed += 1;
        }
    }
    refreshed
}
