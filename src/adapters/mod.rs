//! Adapters - concrete implementations of the ports.

pub mod http;
pub mod llm;
pub mod report;
pub mod store;
