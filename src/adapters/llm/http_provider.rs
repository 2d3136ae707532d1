//! HTTP chat-completion provider.
//!
//! Speaks the OpenAI-compatible `/chat/completions` dialect used by Groq,
//! Mistral, and similar vendors, so one adapter covers every configured
//! provider. Credentials are injected per call by the resilient client.
//!
//! # Configuration
//!
//! ```ignore
//! let provider = HttpChatProvider::new(
//!     ChatProviderConfig::new("groq", "https://api.groq.com/openai/v1")
//!         .with_model("llama-3.3-70b-versatile"),
//! );
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    ChatMessage, ChatRequest, ChatResponse, ChatRole, Credential, LlmError, LlmProvider,
};

/// Configuration for one OpenAI-compatible provider endpoint.
#[derive(Debug, Clone)]
pub struct ChatProviderConfig {
    /// Provider name for logs ("groq", "mistral").
    pub name: String,
    /// Base URL up to the API version segment.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Connect/read timeout on the HTTP client itself.
    pub timeout: Duration,
}

impl ChatProviderConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI-compatible chat completions adapter.
pub struct HttpChatProvider {
    config: ChatProviderConfig,
    client: Client,
}

impl HttpChatProvider {
    pub fn new(config: ChatProviderConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::network(format!("http client init: {e}")))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire(&self, request: &ChatRequest) -> WireRequest {
        let mut messages = Vec::new();
        if let Some(ref prompt) = request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for ChatMessage { role, content } in &request.messages {
            messages.push(WireMessage {
                role: match role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: content.clone(),
            });
        }
        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn handle_error(&self, response: Response) -> LlmError {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationFailed,
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30);
                LlmError::RateLimited { retry_after_secs }
            }
            s if s.is_server_error() => {
                LlmError::unavailable(format!("{}: HTTP {}", self.config.name, s))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                LlmError::InvalidRequest(format!("HTTP {}: {}", s, body))
            }
        }
    }
}

#[async_trait]
impl LlmProvider for HttpChatProvider {
    async fn complete(
        &self,
        request: &ChatRequest,
        credential: &Credential,
    ) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(credential.key.expose_secret())
            .json(&self.to_wire(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    }
                } else {
                    LlmError::network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::parse(format!("{}: {}", self.config.name, e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::parse("response contained no choices"))?;

        Ok(ChatResponse {
            content,
            model: body.model.unwrap_or_else(|| self.config.model.clone()),
            provider: self.config.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: Option<String>,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}
