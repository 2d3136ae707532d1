//! Finalize decision rule.
//!
//! A pure threshold check over countable session state. Finalize is a
//! decision event, not a terminal transition: the session keeps engaging
//! after the report goes out, and repeat decisions are absorbed by the
//! aggregate's finalize latch.

use crate::domain::foundation::EndReason;
use crate::domain::session::Session;

/// Thresholds for the finalize decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndPolicy {
    /// Distinct actionable categories that satisfy the intelligence goal.
    pub min_intel_categories: usize,
    /// Inbound message count that triggers finalize on its own.
    pub max_messages: u32,
    /// Absolute ceiling; finalize fires here no matter how the other
    /// thresholds are configured.
    pub hard_message_cap: u32,
}

impl Default for EndPolicy {
    fn default() -> Self {
        Self {
            min_intel_categories: 2,
            max_messages: 15,
            hard_message_cap: 50,
        }
    }
}

/// Evaluates the finalize rule after each processed turn.
#[derive(Debug, Clone, Copy)]
pub struct EndDetector {
    policy: EndPolicy,
}

impl EndDetector {
    pub fn new(policy: EndPolicy) -> Self {
        Self { policy }
    }

    /// Returns the reason to finalize now, or `None` to keep going.
    ///
    /// Intelligence sufficiency wins over message count when both hold.
    pub fn evaluate(&self, session: &Session) -> Option<EndReason> {
        let categories = session.intelligence().distinct_actionable_categories();
        let messages = session.total_messages();

        if categories >= self.policy.min_intel_categories {
            Some(EndReason::IntelligenceGathered)
        } else if messages >= self.policy.hard_message_cap {
            Some(EndReason::MaxMessages)
        } else if messages >= self.policy.max_messages {
            Some(EndReason::MaxMessages)
        } else {
            None
        }
    }
}
