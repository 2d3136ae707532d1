//! LLM adapters: HTTP provider, failover client, and the test mock.

mod http_provider;
mod resilient;

pub use http_provider::{ChatProviderConfig, HttpChatProvider};
pub use resilient::{ProviderSlot, ResilientLlmClient, RotationPolicy};

mod mock;
pub use mock::{MockLlmProvider, MockOutcome};
