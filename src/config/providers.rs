//! LLM provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// LLM provider configuration.
///
/// API keys come in comma-separated so a deployment can load several keys
/// per provider through one environment variable; the resilient client
/// rotates through them in the listed order.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Groq API keys, comma-separated, tried first.
    pub groq_api_keys: Option<String>,

    /// Mistral API keys, comma-separated, tried after Groq.
    pub mistral_api_keys: Option<String>,

    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    #[serde(default = "default_mistral_base_url")]
    pub mistral_base_url: String,

    #[serde(default = "default_mistral_model")]
    pub mistral_model: String,

    /// Bounded wall-clock budget for a single provider attempt, in seconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Pause between consecutive failover attempts, in milliseconds.
    #[serde(default = "default_attempt_delay")]
    pub attempt_delay_ms: u64,
}

impl ProvidersConfig {
    pub fn groq_keys(&self) -> Vec<String> {
        split_keys(self.groq_api_keys.as_deref())
    }

    pub fn mistral_keys(&self) -> Vec<String> {
        split_keys(self.mistral_api_keys.as_deref())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn attempt_delay(&self) -> Duration {
        Duration::from_millis(self.attempt_delay_ms)
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.groq_keys().is_empty() && self.mistral_keys().is_empty() {
            return Err(ValidationError::NoProviderKeys);
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            groq_api_keys: None,
            mistral_api_keys: None,
            groq_base_url: default_groq_base_url(),
            groq_model: default_groq_model(),
            mistral_base_url: default_mistral_base_url(),
            mistral_model: default_mistral_model(),
            attempt_timeout_secs: default_attempt_timeout(),
            attempt_delay_ms: default_attempt_delay(),
        }
    }
}

fn split_keys(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_mistral_base_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_mistral_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_attempt_timeout() -> u64 {
    20
}

fn default_attempt_delay() -> u64 {
    100
}
