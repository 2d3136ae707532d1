//! Engagement phase and persona tone derivation.
//!
//! Both are pure functions of countable session state, recomputed every
//! turn. Nothing here persists: the same inputs always give the same phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::classify::ThreatLevel;

/// Conversational strategy for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPhase {
    /// Early turns: express interest, build credibility.
    TrustBuilding,
    /// Ask clarifying questions that nudge toward payment details.
    Probing,
    /// Directly request the remaining account or contact details.
    Extraction,
}

impl EngagementPhase {
    /// Derives the phase from the scammer turn count and the number of
    /// distinct actionable intelligence categories gathered so far.
    pub fn derive(scammer_turns: usize, actionable_categories: usize, trust_turns: usize) -> Self {
        if scammer_turns < trust_turns {
            EngagementPhase::TrustBuilding
        } else if actionable_categories < 2 {
            EngagementPhase::Probing
        } else {
            EngagementPhase::Extraction
        }
    }

    /// Prompt guidance for this phase.
    pub fn guidance(&self) -> &'static str {
        match self {
            EngagementPhase::TrustBuilding => {
                "Express INTEREST and excitement. Ask how to proceed. \
                 Do not ask for their details yet."
            }
            EngagementPhase::Probing => {
                "Show mild CONFUSION about the link or process. Offer to call them \
                 or pay directly, so they share a number or payment ID."
            }
            EngagementPhase::Extraction => {
                "Be DIRECT: say you are ready to pay and ask for their account, \
                 UPI ID, or phone number right away."
            }
        }
    }
}

impl fmt::Display for EngagementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngagementPhase::TrustBuilding => "trust_building",
            EngagementPhase::Probing => "probing",
            EngagementPhase::Extraction => "extraction",
        };
        write!(f, "{}", s)
    }
}

/// Emotional register of the persona, fixed by the triage threat signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Worried compliance, for coercive scams (account blocked, legal action).
    Urgent,
    /// Delighted enthusiasm, for reward scams (lottery, job offers).
    Excited,
}

impl Tone {
    pub fn for_threat(threat: ThreatLevel) -> Self {
        match threat {
            ThreatLevel::Coercive => Tone::Urgent,
            ThreatLevel::Routine => Tone::Excited,
        }
    }

    /// Prompt guidance for this tone.
    pub fn guidance(&self) -> &'static str {
        match self {
            Tone::Urgent => "You are WORRIED and want to fix this quickly. You comply eagerly.",
            Tone::Excited => "You are EXCITED about the offer and keen to claim it.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_turns_build_trust() {
        assert_eq!(EngagementPhase::derive(0, 0, 2), EngagementPhase::TrustBuilding);
        assert_eq!(EngagementPhase::derive(1, 3, 2), EngagementPhase::TrustBuilding);
    }

    #[test]
    fn probing_until_two_categories() {
        assert_eq!(EngagementPhase::derive(2, 0, 2), EngagementPhase::Probing);
        assert_eq!(EngagementPhase::derive(5, 1, 2), EngagementPhase::Probing);
    }

    #[test]
    fn extraction_once_categories_accumulate() {
        assert_eq!(EngagementPhase::derive(2, 2, 2), EngagementPhase::Extraction);
        assert_eq!(EngagementPhase::derive(10, 4, 2), EngagementPhase::Extraction);
    }

    #[test]
    fn tone_follows_threat_signal() {
        assert_eq!(Tone::for_threat(ThreatLevel::Coercive), Tone::Urgent);
        assert_eq!(Tone::for_threat(ThreatLevel::Routine), Tone::Excited);
    }
}
