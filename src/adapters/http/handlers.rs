//! HTTP handlers for the engagement endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{InboundMessage, Orchestrator};
use crate::domain::foundation::{DomainError, EndReason, ErrorCode, SessionId};
use crate::domain::session::ChannelMetadata;

use super::dto::{
    DetectRequest, DetectResponse, EndSessionRequest, ErrorResponse, SessionDetailResponse,
    SessionSummaryResponse,
};

/// Shared handler state.
#[derive(Clone)]
pub struct EngagementHandlers {
    orchestrator: Arc<Orchestrator>,
}

impl EngagementHandlers {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// POST /api/detect - process one inbound message
pub async fn detect(
    State(handlers): State<EngagementHandlers>,
    Json(request): Json<DetectRequest>,
) -> Response {
    let session_id = match request.session_id {
        Some(raw) => match SessionId::new(raw) {
            Ok(id) => Some(id),
            Err(err) => return bad_request(err.to_string()),
        },
        None => None,
    };

    let defaults = ChannelMetadata::default();
    let metadata = match request.metadata {
        Some(m) => ChannelMetadata::new(
            m.channel.unwrap_or(defaults.channel),
            m.language.unwrap_or(defaults.language),
            m.locale.unwrap_or(defaults.locale),
        ),
        None => defaults,
    };

    let message = InboundMessage {
        session_id,
        text: request.message.text,
        metadata,
    };

    match handlers.orchestrator.handle_message(message).await {
        Ok(outcome) => (StatusCode::OK, Json(DetectResponse::from(outcome))).into_response(),
        Err(err) => domain_error_response(err),
    }
}

/// GET /api/sessions - list session summaries
pub async fn list_sessions(State(handlers): State<EngagementHandlers>) -> Response {
    match handlers.orchestrator.list_sessions().await {
        Ok(sessions) => {
            let summaries: Vec<SessionSummaryResponse> =
                sessions.iter().map(Into::into).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// GET /api/sessions/:id - full session record
pub async fn get_session(
    State(handlers): State<EngagementHandlers>,
    Path(id): Path<String>,
) -> Response {
    let session_id = match SessionId::new(id) {
        Ok(id) => id,
        Err(err) => return bad_request(err.to_string()),
    };

    match handlers.orchestrator.get_session(&session_id).await {
        Ok(Some(session)) => {
            (StatusCode::OK, Json(SessionDetailResponse::from(&session))).into_response()
        }
        Ok(None) => domain_error_response(DomainError::session_not_found(&session_id)),
        Err(err) => domain_error_response(err),
    }
}

/// POST /api/sessions/:id/end - force-end a session
pub async fn end_session(
    State(handlers): State<EngagementHandlers>,
    Path(id): Path<String>,
    body: Option<Json<EndSessionRequest>>,
) -> Response {
    let session_id = match SessionId::new(id) {
        Ok(id) => id,
        Err(err) => return bad_request(err.to_string()),
    };
    let reason = body
        .and_then(|Json(b)| b.reason)
        .unwrap_or(EndReason::MaxMessages);

    match handlers.orchestrator.force_end(&session_id, reason).await {
        Ok(session) => {
            (StatusCode::OK, Json(SessionDetailResponse::from(&session))).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("VALIDATION_FAILED", message)),
    )
        .into_response()
}

/// Maps a domain error to the HTTP status and error body.
///
/// Transient errors map to 503 so clients know the same request may be
/// retried verbatim.
fn domain_error_response(err: DomainError) -> Response {
    let status = if err.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::SessionNotFound => StatusCode::NOT_FOUND,
            ErrorCode::SessionEnded | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    };
    (
        status,
        Json(ErrorResponse::new(err.code.to_string(), err.message)),
    )
        .into_response()
}
