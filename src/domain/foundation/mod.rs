//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod session_status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::SessionId;
pub use session_status::{EndReason, SessionStatus};
pub use timestamp::Timestamp;
