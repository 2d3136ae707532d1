//! Closing-notes composition.
//!
//! Deterministic template over the gathered state; no model call is made
//! for summaries, so the timeout path stays cheap and always succeeds.

use crate::domain::foundation::EndReason;
use crate::domain::session::Session;

/// Composes the agent-notes summary submitted with the report.
pub fn engagement_summary(session: &Session, reason: EndReason) -> String {
    let scam_type = session
        .scam_type()
        .map(|t| format!("{:?}", t))
        .unwrap_or_else(|| "Unclassified".to_string());
    let trigger = match reason {
        EndReason::IntelligenceGathered => "intelligence goal reached",
        EndReason::MaxMessages => "message limit reached",
        EndReason::Timeout => "scammer went quiet",
    };
    format!(
        "{} scam engaged over {} scammer message(s); extracted {} item(s) across {} actionable categorie(s). Engagement closed: {}.",
        scam_type,
        session.total_messages(),
        session.intelligence().total_items(),
        session.intelligence().distinct_actionable_categories(),
        trigger,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify::{ScamType, ThreatLevel};
    use crate::domain::foundation::SessionId;
    use crate::domain::session::{ChannelMetadata, IntelCategory, Intelligence};

    #[test]
    fn summary_names_type_counts_and_trigger() {
        let mut session = Session::new(
            SessionId::new("s1").unwrap(),
            ChannelMetadata::default(),
            Some(ScamType::OtpPhishing),
            0.9,
            ThreatLevel::Coercive,
        );
        session.record_scammer_turn("send otp").unwrap();
        let mut delta = Intelligence::new();
        delta.insert(IntelCategory::PhoneNumbers, "9876543210");
        session.merge_intelligence(&delta).unwrap();

        let summary = engagement_summary(&session, EndReason::Timeout);
        assert!(summary.contains("OtpPhishing"));
        assert!(summary.contains("1 scammer message(s)"));
        assert!(summary.contains("scammer went quiet"));
    }
}
