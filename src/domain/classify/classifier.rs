//! One-shot scam/human triage for first contact.
//!
//! Runs exactly once, at the first message associated with a new session
//! identifier. A `Human` verdict terminates processing with no session
//! created; a `Scammer` verdict creates the session and the triggering
//! message becomes its first turn.

use serde::{Deserialize, Serialize};

use super::signals::{self, ActionRisk, LinkRisk, ThreatLevel};

/// Triage outcome for a first-contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Human,
    Scammer,
}

/// Best-effort hint at the scam family, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamType {
    AccountFraud,
    LotteryPrize,
    OtpPhishing,
    PaymentRequest,
    JobOffer,
}

/// Combined result of the four triage signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Confidence in the verdict, in [0, 1].
    pub confidence: f32,
    pub scam_type: Option<ScamType>,
    /// Urgency signal, carried forward to drive the persona tone.
    pub threat: ThreatLevel,
}

impl Classification {
    pub fn is_scam(&self) -> bool {
        self.verdict == Verdict::Scammer
    }
}

/// Heuristic first-contact classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates the four signals in fixed order and combines them.
    pub fn classify(&self, text: &str) -> Classification {
        // 1. Brand recognition
        let brand = signals::brand_recognized(text);
        // 2. Action analysis
        let action = signals::action_risk(text);
        // 3. Threat analysis
        let threat = signals::threat_level(text);
        // 4. Link analysis
        let link = signals::link_risk(text);

        let mut indicators = 0u8;
        if action == ActionRisk::Dangerous {
            indicators += 1;
        }
        if threat == ThreatLevel::Coercive {
            indicators += 1;
        }
        if link == LinkRisk::Suspicious {
            indicators += 1;
        }

        if indicators == 0 {
            // All signals benign. A recognized brand strengthens the call.
            let confidence = if brand { 0.9 } else { 0.7 };
            return Classification {
                verdict: Verdict::Human,
                confidence,
                scam_type: None,
                threat,
            };
        }

        let confidence = (0.6 + 0.12 * f32::from(indicators)).min(0.95);
        Classification {
            verdict: Verdict::Scammer,
            confidence,
            scam_type: Some(Self::scam_type_hint(text, threat)),
            threat,
        }
    }

    /// Picks a family hint from the message wording.
    fn scam_type_hint(text: &str, threat: ThreatLevel) -> ScamType {
        let lower = text.to_lowercase();
        if ["lottery", "prize", "won", "winner", "claim"]
            .iter()
            .any(|k| lower.contains(k))
        {
            ScamType::LotteryPrize
        } else if ["otp", "pin", "cvv", "password"].iter().any(|k| lower.contains(k)) {
            ScamType::OtpPhishing
        } else if ["job", "salary", "work from home", "hiring"]
            .iter()
            .any(|k| lower.contains(k))
        {
            ScamType::JobOffer
        } else if ["account", "kyc", "bank", "verify"].iter().any(|k| lower.contains(k))
            || threat == ThreatLevel::Coercive
        {
            ScamType::AccountFraud
        } else {
            ScamType::PaymentRequest
        }
    }
}
