//! HTTP adapter - REST API over the orchestrator.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::EngagementHandlers;
pub use routes::api_routes;
