//! HTTP routes for the engagement API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{detect, end_session, get_session, list_sessions, EngagementHandlers};

/// Creates the API router with all endpoints.
pub fn api_routes(handlers: EngagementHandlers) -> Router {
    Router::new()
        .route("/api/detect", post(detect))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/end", post(end_session))
        .layer(TraceLayer::new_for_http())
        .with_state(handlers)
}
