//! Scambait - Agentic Scam-Engagement Honeypot
//!
//! This crate classifies inbound text messages as benign or scam attempts and,
//! for scams, runs a stateful multi-turn engagement loop that impersonates a
//! victim, extracts actionable intelligence, and reports the session once
//! enough has been gathered.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
