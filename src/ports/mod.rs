//! Ports - interfaces between the core and external collaborators.

mod llm_provider;
mod report_sink;
mod session_store;

pub use llm_provider::{
    ChatMessage, ChatRequest, ChatResponse, ChatRole, Credential, LlmCaller, LlmError, LlmProvider,
};
pub use report_sink::{EngagementMetrics, ReportError, ReportSink, SessionReport};
pub use session_store::{SessionStore, StoreError};
