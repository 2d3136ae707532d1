//! Application services - orchestration over the domain and ports.

pub mod locks;
pub mod orchestrator;
pub mod summary;
pub mod sweeper;

pub use locks::SessionLocks;
pub use orchestrator::{EngagementOutcome, InboundMessage, Orchestrator};
pub use sweeper::{SweeperConfig, TimeoutSweeper};
