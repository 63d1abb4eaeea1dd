//! The model-backend boundary.
//!
//! Generative participants are served by something implementing
//! [`ModelBackend`]. Concrete HTTP clients live in the interaction crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::participant::ModelBinding;

/// Role of one transcript entry sent to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Why a backend call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("missing API key for {provider}")]
    MissingCredentials { provider: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no reply within {secs}s")]
    Timeout { secs: u64 },
}

/// A chat-completion capability.
#[async_trait::async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short name used in logs and error notices.
    fn name(&self) -> &str;

    /// Sends `transcript` to the model described by `binding` and returns
    /// the reply text.
    async fn chat(
        &self,
        binding: &ModelBinding,
        transcript: &[ChatMessage],
    ) -> Result<String, BackendError>;
}
