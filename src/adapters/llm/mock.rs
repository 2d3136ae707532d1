//! Mock LLM provider for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::{ChatRequest, ChatResponse, Credential, LlmError, LlmProvider};

/// Scripted result of one mock attempt.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Reply(String),
    RateLimited,
    Unavailable,
    Network,
    AuthenticationFailed,
    /// Sleeps for the given duration, then answers; drives timeout tests.
    Hang(Duration),
}

/// Provider stub that replays a scripted outcome per call and records the
/// credential used for each attempt.
pub struct MockLlmProvider {
    name: String,
    script: Mutex<VecDeque<MockOutcome>>,
    labels: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            labels: Mutex::new(Vec::new()),
        })
    }

    /// Appends outcomes, consumed one per call in order.
    pub fn with_outcomes(self: Arc<Self>, outcomes: Vec<MockOutcome>) -> Arc<Self> {
        self.script.lock().unwrap().extend(outcomes);
        self
    }

    /// Credential labels seen so far, in call order.
    pub fn credential_labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.labels.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(
        &self,
        _request: &ChatRequest,
        credential: &Credential,
    ) -> Result<ChatResponse, LlmError> {
        self.labels.lock().unwrap().push(credential.label.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Unavailable);

        match outcome {
            MockOutcome::Reply(content) => Ok(ChatResponse {
                content,
                model: "mock-model".to_string(),
                provider: self.name.clone(),
            }),
            MockOutcome::RateLimited => Err(LlmError::RateLimited {
                retry_after_secs: 30,
            }),
            MockOutcome::Unavailable => Err(LlmError::unavailable("mock outage")),
            MockOutcome::Network => Err(LlmError::network("mock connection reset")),
            MockOutcome::AuthenticationFailed => Err(LlmError::AuthenticationFailed),
            MockOutcome::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(ChatResponse {
                    content: "late reply".to_string(),
                    model: "mock-model".to_string(),
                    provider: self.name.clone(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
