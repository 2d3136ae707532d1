//! Engagement loop configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::SweeperConfig;
use crate::domain::engagement::EndPolicy;

use super::error::ValidationError;

/// Thresholds for the engagement loop and the timeout sweeper.
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Distinct actionable categories that satisfy the intelligence goal.
    #[serde(default = "default_min_intel_categories")]
    pub min_intel_categories: usize,

    /// Inbound message count that triggers finalize on its own.
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Absolute inbound-message ceiling.
    #[serde(default = "default_hard_message_cap")]
    pub hard_message_cap: u32,

    /// Scammer turns spent building trust before probing.
    #[serde(default = "default_trust_turns")]
    pub trust_turns: usize,

    /// Seconds of silence before a session counts as abandoned.
    #[serde(default = "default_inactivity_secs")]
    pub inactivity_secs: u64,

    /// Seconds between sweeper passes.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl EngagementConfig {
    pub fn end_policy(&self) -> EndPolicy {
        EndPolicy {
            min_intel_categories: self.min_intel_categories,
            max_messages: self.max_messages,
            hard_message_cap: self.hard_message_cap,
        }
    }

    pub fn sweeper_config(&self) -> SweeperConfig {
        SweeperConfig {
            interval: Duration::from_secs(self.sweep_interval_secs),
            inactivity_secs: self.inactivity_secs,
        }
    }

    /// Validate engagement configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_intel_categories == 0 {
            return Err(ValidationError::InvalidThreshold("min_intel_categories"));
        }
        if self.max_messages == 0 || self.max_messages > self.hard_message_cap {
            return Err(ValidationError::InvalidThreshold("max_messages"));
        }
        if self.inactivity_secs == 0 || self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidThreshold("sweeper timings"));
        }
        Ok(())
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_intel_categories: default_min_intel_categories(),
            max_messages: default_max_messages(),
            hard_message_cap: default_hard_message_cap(),
            trust_turns: default_trust_turns(),
            inactivity_secs: default_inactivity_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_min_intel_categories() -> usize {
    2
}

fn default_max_messages() -> u32 {
    15
}

fn default_hard_message_cap() -> u32 {
    50
}

fn default_trust_turns() -> usize {
    2
}

fn default_inactivity_secs() -> u64 {
    15
}

fn default_sweep_interval_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngagementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.end_policy().max_messages, 15);
        assert_eq!(config.sweeper_config().inactivity_secs, 15);
    }

    #[test]
    fn max_messages_cannot_exceed_the_hard_cap() {
        let config = EngagementConfig {
            max_messages: 80,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
