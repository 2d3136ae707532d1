//! First-contact scam/human triage.

mod classifier;
mod signals;

pub use classifier::{Classification, Classifier, ScamType, Verdict};
pub use signals::{
    action_risk, brand_recognized, link_risk, threat_level, ActionRisk, LinkRisk, ThreatLevel,
    SHORTENER_DOMAINS,
};
