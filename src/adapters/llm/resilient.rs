//! Resilient multi-provider LLM client.
//!
//! Flattens the configured providers and their API keys into one ordered
//! attempt sequence: every key of the first provider, then every key of the
//! next. Rotation state is a cursor local to each call, so concurrent calls
//! never skip a credential another call already burned. A short fixed pause
//! separates consecutive attempts, and each attempt runs under its own
//! bounded timeout.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ports::{ChatRequest, ChatResponse, Credential, LlmCaller, LlmError, LlmProvider};

/// One provider with its ordered API keys.
pub struct ProviderSlot {
    pub provider: Arc<dyn LlmProvider>,
    pub credentials: Vec<Credential>,
}

impl ProviderSlot {
    pub fn new(provider: Arc<dyn LlmProvider>, credentials: Vec<Credential>) -> Self {
        Self {
            provider,
            credentials,
        }
    }
}

/// Rotation policy for the resilient client.
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    /// Bounded wall-clock budget for a single attempt.
    pub attempt_timeout: Duration,
    /// Pause between consecutive attempts.
    pub attempt_delay: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(20),
            attempt_delay: Duration::from_millis(100),
        }
    }
}

/// Failover client over every configured provider/key combination.
pub struct ResilientLlmClient {
    slots: Vec<ProviderSlot>,
    policy: RotationPolicy,
}

impl ResilientLlmClient {
    pub fn new(slots: Vec<ProviderSlot>, policy: RotationPolicy) -> Self {
        Self { slots, policy }
    }
}

#[async_trait]
impl LlmCaller for ResilientLlmClient {
    /// Tries each provider/credential pair in order until one succeeds.
    ///
    /// Retryable failures rotate to the next pair after the configured
    /// delay; non-retryable errors propagate immediately. When the whole
    /// sequence fails the caller gets `LlmError::Exhausted` carrying the
    /// last underlying error.
    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let mut attempts: u32 = 0;
        let mut last_error: Option<LlmError> = None;

        for slot in &self.slots {
            for credential in &slot.credentials {
                if attempts > 0 {
                    tokio::time::sleep(self.policy.attempt_delay).await;
                }
                attempts += 1;
                debug!(
                    provider = slot.provider.name(),
                    credential = %credential.label,
                    attempt = attempts,
                    "llm attempt"
                );

                let outcome = tokio::time::timeout(
                    self.policy.attempt_timeout,
                    slot.provider.complete(&request, credential),
                )
                .await;

                match outcome {
                    Err(_) => {
                        let err = LlmError::Timeout {
                            timeout_ms: self.policy.attempt_timeout.as_millis() as u64,
                        };
                        warn!(
                            provider = slot.provider.name(),
                            credential = %credential.label,
                            error = %err,
                            "llm attempt timed out"
                        );
                        last_error = Some(err);
                    }
                    Ok(Ok(response)) => {
                        info!(
                            provider = slot.provider.name(),
                            credential = %credential.label,
                            attempt = attempts,
                            "llm attempt succeeded"
                        );
                        return Ok(response);
                    }
                    Ok(Err(err)) if err.is_retryable() => {
                        warn!(
                            provider = slot.provider.name(),
                            credential = %credential.label,
                            error = %err,
                            "llm attempt failed, rotating"
                        );
                        last_error = Some(err);
                    }
                    Ok(Err(err)) => {
                        warn!(
                            provider = slot.provider.name(),
                            credential = %credential.label,
                            error = %err,
                            "llm attempt failed with non-retryable error"
                        );
                        return Err(err);
                    }
                }
            }
        }

        Err(LlmError::Exhausted {
            attempts,
            last: Box::new(
                last_error.unwrap_or_else(|| LlmError::unavailable("no providers configured")),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::{MockLlmProvider, MockOutcome};

    fn creds(labels: &[&str]) -> Vec<Credential> {
        labels
            .iter()
            .map(|l| Credential::new(*l, format!("secret-{l}")))
            .collect()
    }

    fn policy_ms(delay: u64) -> RotationPolicy {
        RotationPolicy {
            attempt_timeout: Duration::from_secs(5),
            attempt_delay: Duration::from_millis(delay),
        }
    }

    #[tokio::test]
    async fn first_credential_success_makes_one_attempt() {
        let provider = MockLlmProvider::new("groq").with_outcomes(vec![MockOutcome::Reply(
            "hello".into(),
        )]);
        let client = ResilientLlmClient::new(
            vec![ProviderSlot::new(provider.clone(), creds(&["key-1", "key-2"]))],
            policy_ms(0),
        );

        let response = client.call(ChatRequest::new()).await.unwrap();
        assert_eq!(response.content, "hello");
        assert_eq!(provider.credential_labels(), vec!["key-1"]);
    }

    #[tokio::test]
    async fn rotates_keys_within_a_provider_then_providers() {
        let groq = MockLlmProvider::new("groq").with_outcomes(vec![
            MockOutcome::RateLimited,
            MockOutcome::Unavailable,
        ]);
        let mistral = MockLlmProvider::new("mistral")
            .with_outcomes(vec![MockOutcome::Reply("finally".into())]);

        let client = ResilientLlmClient::new(
            vec![
                ProviderSlot::new(groq.clone(), creds(&["g-1", "g-2"])),
                ProviderSlot::new(mistral.clone(), creds(&["m-1"])),
            ],
            policy_ms(0),
        );

        let response = client.call(ChatRequest::new()).await.unwrap();
        assert_eq!(response.provider, "mistral");
        assert_eq!(groq.credential_labels(), vec!["g-1", "g-2"]);
        assert_eq!(mistral.credential_labels(), vec!["m-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_consecutive_attempts() {
        let provider = MockLlmProvider::new("groq").with_outcomes(vec![
            MockOutcome::Unavailable,
            MockOutcome::Unavailable,
            MockOutcome::Reply("third time lucky".into()),
        ]);
        let client = ResilientLlmClient::new(
            vec![ProviderSlot::new(
                provider,
                creds(&["key-1", "key-2", "key-3"]),
            )],
            policy_ms(100),
        );

        let started = tokio::time::Instant::now();
        let response = client.call(ChatRequest::new()).await.unwrap();
        assert_eq!(response.content, "third time lucky");
        // Two failures mean two inter-attempt pauses before the third try.
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn non_retryable_error_stops_rotation() {
        let provider = MockLlmProvider::new("groq").with_outcomes(vec![
            MockOutcome::AuthenticationFailed,
            MockOutcome::Reply("never reached".into()),
        ]);
        let client = ResilientLlmClient::new(
            vec![ProviderSlot::new(provider.clone(), creds(&["key-1", "key-2"]))],
            policy_ms(0),
        );

        let err = client.call(ChatRequest::new()).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed));
        assert_eq!(provider.credential_labels(), vec!["key-1"]);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempt_count_and_last_error() {
        let groq = MockLlmProvider::new("groq").with_outcomes(vec![
            MockOutcome::RateLimited,
            MockOutcome::Network,
        ]);
        let mistral = MockLlmProvider::new("mistral").with_outcomes(vec![MockOutcome::Unavailable]);

        let client = ResilientLlmClient::new(
            vec![
                ProviderSlot::new(groq, creds(&["g-1", "g-2"])),
                ProviderSlot::new(mistral, creds(&["m-1"])),
            ],
            policy_ms(0),
        );

        match client.call(ChatRequest::new()).await.unwrap_err() {
            LlmError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, LlmError::Unavailable { .. }));
            }
            other => panic!("expected Exhausted, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out_and_rotates() {
        let provider = MockLlmProvider::new("groq").with_outcomes(vec![
            MockOutcome::Hang(Duration::from_secs(60)),
            MockOutcome::Reply("recovered".into()),
        ]);
        let client = ResilientLlmClient::new(
            vec![ProviderSlot::new(provider, creds(&["key-1", "key-2"]))],
            policy_ms(100),
        );

        let response = client.call(ChatRequest::new()).await.unwrap();
        assert_eq!(response.content, "recovered");
    }

    #[tokio::test]
    async fn empty_configuration_is_exhausted_immediately() {
        let client = ResilientLlmClient::new(Vec::new(), policy_ms(0));
        match client.call(ChatRequest::new()).await.unwrap_err() {
            LlmError::Exhausted { attempts, .. } => assert_eq!(attempts, 0),
            other => panic!("expected Exhausted, got {other}"),
        }
    }
}
