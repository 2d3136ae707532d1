//! Reporting collaborator port.
//!
//! One-shot `submit(report)`; no response is required for correctness and
//! failures must never propagate to the request that triggered submission.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::{Intelligence, Session};

/// Engagement statistics included with every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub engagement_duration_seconds: u64,
    pub total_messages_exchanged: u32,
}

/// Summary submitted to the external reporting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: SessionId,
    pub scam_detected: bool,
    pub total_messages_exchanged: u32,
    pub extracted_intelligence: Intelligence,
    pub agent_notes: String,
    pub engagement_metrics: EngagementMetrics,
}

impl SessionReport {
    /// Builds a report from the current session state.
    pub fn from_session(session: &Session, now: &Timestamp) -> Self {
        Self {
            session_id: session.session_id().clone(),
            scam_detected: true,
            total_messages_exchanged: session.total_messages(),
            extracted_intelligence: session.intelligence().clone(),
            agent_notes: session.agent_notes().to_string(),
            engagement_metrics: EngagementMetrics {
                engagement_duration_seconds: session.engagement_duration_secs(now),
                total_messages_exchanged: session.total_messages(),
            },
        }
    }
}

/// Reporting errors. Always logged, never fatal to the triggering turn.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report submission failed: {0}")]
    Submission(String),
}

/// Port for the external result-submission collaborator.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Submit a session summary. Fire-and-forget semantics.
    async fn submit(&self, report: &SessionReport) -> Result<(), ReportError>;
}
