//! SessionStatus and EndReason enums for tracking engagement lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an engagement session.
///
/// `Ended` is terminal: once reached, no field but audit metadata may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    /// Claimed by the timeout sweeper; blocks concurrent termination.
    ProcessingTimeout,
    Ended,
}

impl SessionStatus {
    /// Returns true if the session can still process turns.
    pub fn is_mutable(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Returns true if the session has reached its terminal state.
    pub fn is_ended(&self) -> bool {
        matches!(self, SessionStatus::Ended)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Active -> ProcessingTimeout
    /// - Active -> Ended
    /// - ProcessingTimeout -> Ended
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Active, ProcessingTimeout) | (Active, Ended) | (ProcessingTimeout, Ended)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "Active",
            SessionStatus::ProcessingTimeout => "ProcessingTimeout",
            SessionStatus::Ended => "Ended",
        };
        write!(f, "{}", s)
    }
}

/// Why an engagement session was terminated.
///
/// Set exactly once, at the transition into `SessionStatus::Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Enough intelligence categories were populated.
    IntelligenceGathered,
    /// The session went inactive past the configured threshold.
    Timeout,
    /// The message ceiling was reached, or an operator force-ended.
    MaxMessages,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::IntelligenceGathered => "intelligence_gathered",
            EndReason::Timeout => "timeout",
            EndReason::MaxMessages => "max_messages",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_active() {
        assert_eq!(SessionStatus::default(), SessionStatus::Active);
    }

    #[test]
    fn only_active_is_mutable() {
        assert!(SessionStatus::Active.is_mutable());
        assert!(!SessionStatus::ProcessingTimeout.is_mutable());
        assert!(!SessionStatus::Ended.is_mutable());
    }

    #[test]
    fn active_can_enter_timeout_processing() {
        assert!(SessionStatus::Active.can_transition_to(&SessionStatus::ProcessingTimeout));
    }

    #[test]
    fn both_live_states_can_end() {
        assert!(SessionStatus::Active.can_transition_to(&SessionStatus::Ended));
        assert!(SessionStatus::ProcessingTimeout.can_transition_to(&SessionStatus::Ended));
    }

    #[test]
    fn ended_is_terminal() {
        assert!(!SessionStatus::Ended.can_transition_to(&SessionStatus::Active));
        assert!(!SessionStatus::Ended.can_transition_to(&SessionStatus::ProcessingTimeout));
        assert!(!SessionStatus::Ended.can_transition_to(&SessionStatus::Ended));
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::ProcessingTimeout).unwrap(),
            "\"processing_timeout\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::IntelligenceGathered).unwrap(),
            "\"intelligence_gathered\""
        );
    }
}
