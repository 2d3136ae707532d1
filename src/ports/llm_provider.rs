//! LLM provider port - interface for language-model integrations.
//!
//! Abstracts all chat-completion traffic so the engagement stages never
//! couple to a specific vendor. Credentials are supplied per call by the
//! resilient client, which owns rotation across providers and keys.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Port for chat-completion providers.
///
/// Implementations translate between a vendor API and the request/response
/// shapes below. They must not retry internally: failover policy lives in
/// the resilient client wrapping them.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a single completion using the given credential.
    async fn complete(
        &self,
        request: &ChatRequest,
        credential: &Credential,
    ) -> Result<ChatResponse, LlmError>;

    /// Provider name for logs and error aggregation (e.g. "groq").
    fn name(&self) -> &str;
}

/// Resilient call surface consumed by the engagement stages.
///
/// Implemented by the failover client; stages depend on this rather than on
/// any single provider so rotation policy stays in one place.
#[async_trait]
pub trait LlmCaller: Send + Sync {
    /// Issue a completion, failing over across providers and credentials.
    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// One API key for a provider, with a label safe to log.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Loggable identifier ("key-1", never the secret itself).
    pub label: String,
    /// The API key.
    pub key: SecretString,
}

impl Credential {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: SecretString::new(key.into()),
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A message in the completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Role of the message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    /// Model that produced the response.
    pub model: String,
    /// Provider that produced the response.
    pub provider: String,
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider returned a server error or is down.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// The bounded per-attempt timeout elapsed.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Malformed request; retrying other credentials cannot help.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Every provider/credential combination failed.
    #[error("all {attempts} provider attempts failed; last error: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if the next credential or provider should be tried.
    ///
    /// Validation/client errors propagate immediately without rotation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::Unavailable { .. }
                | LlmError::Network(_)
                | LlmError::Timeout { .. }
        )
    }
}
