//! Multi-turn engagement: persona replies and the finalize rule.

mod agent;
mod end_detector;
mod phase;

pub use agent::{AgentReply, ConversationalAgent};
pub use end_detector::{EndDetector, EndPolicy};
pub use phase::{EngagementPhase, Tone};
