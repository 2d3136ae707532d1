//! HTTP DTOs for the engagement endpoints.
//!
//! These types decouple the HTTP API from domain types. Request parsing is
//! deliberately lenient: unknown fields are ignored and optional fields get
//! defaults, since upstream message gateways vary in what they send.

use serde::{Deserialize, Serialize};

use crate::application::EngagementOutcome;
use crate::domain::classify::ScamType;
use crate::domain::foundation::{EndReason, SessionStatus};
use crate::domain::session::{Intelligence, Sender, Session};
use crate::ports::EngagementMetrics;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Inbound message payload for POST /api/detect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: MessagePayload,
    #[serde(default)]
    pub metadata: Option<MetadataPayload>,
}

/// The message body. Sender and timestamp are informational only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub sender: Option<String>,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Channel tags; any subset may be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Body for POST /api/sessions/{id}/end.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(default)]
    pub reason: Option<EndReason>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for POST /api/detect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub scam_detected: bool,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_intelligence: Option<Intelligence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_metrics: Option<EngagementMetrics>,
}

impl From<EngagementOutcome> for DetectResponse {
    fn from(outcome: EngagementOutcome) -> Self {
        Self {
            scam_detected: outcome.scam_detected,
            reply: outcome.reply,
            session_id: outcome.session_id.map(|id| id.to_string()),
            status: outcome.status,
            extracted_intelligence: outcome.extracted_intelligence,
            engagement_metrics: outcome.engagement_metrics,
        }
    }
}

/// Session summary for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryResponse {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scam_type: Option<ScamType>,
    pub confidence: f32,
    pub total_messages: u32,
    pub finalized: bool,
    pub created_at: String,
    pub last_activity: String,
}

impl From<&Session> for SessionSummaryResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            status: session.status(),
            scam_type: session.scam_type(),
            confidence: session.confidence(),
            total_messages: session.total_messages(),
            finalized: session.is_finalized(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            last_activity: session.last_activity().as_datetime().to_rfc3339(),
        }
    }
}

/// One turn in the detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub sender: Sender,
    pub text: String,
    pub timestamp: String,
}

/// Full session record for GET /api/sessions/{id}.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub summary: SessionSummaryResponse,
    pub conversation_history: Vec<TurnResponse>,
    pub extracted_intelligence: Intelligence,
    pub agent_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl From<&Session> for SessionDetailResponse {
    fn from(session: &Session) -> Self {
        Self {
            summary: session.into(),
            conversation_history: session
                .conversation_history()
                .iter()
                .map(|t| TurnResponse {
                    sender: t.sender,
                    text: t.text.clone(),
                    timestamp: t.timestamp.as_datetime().to_rfc3339(),
                })
                .collect(),
            extracted_intelligence: session.intelligence().clone(),
            agent_notes: session.agent_notes().to_string(),
            end_reason: session.end_reason(),
            ended_at: session.ended_at().map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}
