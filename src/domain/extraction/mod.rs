//! Hybrid pattern+model intelligence extraction.

mod engine;
mod patterns;

pub use engine::ExtractionEngine;
pub use patterns::{apply_boosts, has_actionable, pattern_pass};
