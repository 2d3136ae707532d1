//! Session aggregate entity.
//!
//! A session is one tracked multi-turn engagement with a single message
//! source. It is created by the orchestrator on the first scam-classified
//! message, mutated only under the per-session lock (normal turns) or by the
//! timeout sweeper (forced termination), and never deleted by the core.
//!
//! # Invariants
//!
//! - `conversation_history` is append-only, in arrival order
//! - `intelligence` only ever grows (monotonic union)
//! - `total_messages` counts processed inbound messages, once each
//! - once `Ended`, nothing but audit metadata changes; `end_reason` is set
//!   exactly once at that transition

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::classify::{ScamType, ThreatLevel};
use crate::domain::foundation::{
    DomainError, EndReason, ErrorCode, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::{Intelligence, Sender, Turn};

/// Immutable contextual tags set at session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub channel: String,
    pub language: String,
    pub locale: String,
}

impl ChannelMetadata {
    pub fn new(
        channel: impl Into<String>,
        language: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            language: language.into(),
            locale: locale.into(),
        }
    }
}

impl Default for ChannelMetadata {
    fn default() -> Self {
        Self::new("SMS", "English", "IN")
    }
}

/// Session aggregate - the unit of engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    session_id: SessionId,
    status: SessionStatus,
    created_at: Timestamp,
    last_activity: Timestamp,
    ended_at: Option<Timestamp>,
    metadata: ChannelMetadata,
    conversation_history: Vec<Turn>,
    intelligence: Intelligence,
    total_messages: u32,
    scam_type: Option<ScamType>,
    confidence: f32,
    /// Urgency signal from triage; drives the persona tone every turn.
    threat: ThreatLevel,
    agent_notes: String,
    end_reason: Option<EndReason>,
    /// One-shot latch: the report has been submitted for this session.
    finalized: bool,
    /// Fallback question templates already issued in this session.
    used_templates: BTreeSet<String>,
    /// Optimistic-concurrency counter, bumped by the store on every update.
    version: u64,
}

impl Session {
    /// Creates a new active session from a scam-classified first contact.
    pub fn new(
        session_id: SessionId,
        metadata: ChannelMetadata,
        scam_type: Option<ScamType>,
        confidence: f32,
        threat: ThreatLevel,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            status: SessionStatus::Active,
            created_at: now,
            last_activity: now,
            ended_at: None,
            metadata,
            conversation_history: Vec::new(),
            intelligence: Intelligence::new(),
            total_messages: 0,
            scam_type,
            confidence: confidence.clamp(0.0, 1.0),
            threat,
            agent_notes: String::new(),
            end_reason: None,
            finalized: false,
            used_templates: BTreeSet::new(),
            version: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn last_activity(&self) -> &Timestamp {
        &self.last_activity
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    pub fn metadata(&self) -> &ChannelMetadata {
        &self.metadata
    }

    pub fn conversation_history(&self) -> &[Turn] {
        &self.conversation_history
    }

    pub fn intelligence(&self) -> &Intelligence {
        &self.intelligence
    }

    pub fn total_messages(&self) -> u32 {
        self.total_messages
    }

    pub fn scam_type(&self) -> Option<ScamType> {
        self.scam_type
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn threat(&self) -> ThreatLevel {
        self.threat
    }

    pub fn agent_notes(&self) -> &str {
        &self.agent_notes
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sets the concurrency version. Store adapters only.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Number of inbound turns the counterparty has sent.
    pub fn scammer_turns(&self) -> usize {
        self.conversation_history
            .iter()
            .filter(|t| t.sender == Sender::Scammer)
            .count()
    }

    /// Seconds from creation to `now`.
    pub fn engagement_duration_secs(&self, now: &Timestamp) -> u64 {
        now.secs_since(&self.created_at)
    }

    /// True if the session is active and idle past the threshold.
    pub fn is_stale(&self, now: &Timestamp, inactivity_secs: u64) -> bool {
        self.status == SessionStatus::Active
            && now.secs_since(&self.last_activity) >= inactivity_secs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends an inbound scammer turn, bumping the message counter and
    /// refreshing the activity clock.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` if the session is no longer active
    pub fn record_scammer_turn(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.conversation_history.push(Turn::scammer(text));
        self.total_messages += 1;
        self.last_activity = Timestamp::now();
        Ok(())
    }

    /// Appends the generated honeypot reply.
    ///
    /// Only inbound messages count toward `total_messages`.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` if the session is no longer active
    pub fn record_honeypot_turn(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.conversation_history.push(Turn::honeypot(text));
        Ok(())
    }

    /// Unions newly extracted intelligence into the session. Idempotent.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` if the session is no longer active
    pub fn merge_intelligence(&mut self, delta: &Intelligence) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.intelligence.merge(delta);
        Ok(())
    }

    /// Flips the one-shot finalize latch.
    ///
    /// Returns true on the first call; repeated finalize decisions must not
    /// re-submit the report.
    pub fn mark_finalized(&mut self) -> bool {
        if self.finalized {
            return false;
        }
        self.finalized = true;
        true
    }

    /// Records a fallback template as used. Returns false if it already was.
    pub fn mark_template_used(&mut self, template_id: impl Into<String>) -> bool {
        self.used_templates.insert(template_id.into())
    }

    /// Checks whether a fallback template was already issued.
    pub fn has_used_template(&self, template_id: &str) -> bool {
        self.used_templates.contains(template_id)
    }

    /// Replaces the running engagement summary when a richer one is known.
    pub fn refine_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        if !notes.trim().is_empty() {
            self.agent_notes = notes;
        }
    }

    /// Claims the session for timeout processing.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is not active
    pub fn begin_timeout(&mut self) -> Result<(), DomainError> {
        self.transition_to(SessionStatus::ProcessingTimeout)
    }

    /// Terminates the session, recording the reason exactly once.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session already ended
    pub fn end(&mut self, reason: EndReason, notes: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(SessionStatus::Ended)?;
        self.end_reason = Some(reason);
        self.ended_at = Some(Timestamp::now());
        self.refine_notes(notes);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        if self.status.is_mutable() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::SessionEnded,
                "Cannot modify a terminated session",
            )
            .with_detail("session_id", self.session_id.as_str()))
        }
    }

    fn transition_to(&mut self, target: SessionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {} to {}", self.status, target),
            )
            .with_detail("session_id", self.session_id.as_str()));
        }
        self.status = target;
        Ok(())
    }
}
