//! Engagement orchestrator.
//!
//! Drives the full per-message pipeline: triage on first contact, then the
//! turn loop (append turn, extract, persist, reply, finalize check, persist)
//! under the per-session lock. State is committed after each stage so a
//! later failure never loses intelligence already merged.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::classify::Classifier;
use crate::domain::engagement::{ConversationalAgent, EndDetector};
use crate::domain::extraction::ExtractionEngine;
use crate::domain::foundation::{
    DomainError, EndReason, ErrorCode, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::{ChannelMetadata, Intelligence, Session};
use crate::ports::{EngagementMetrics, ReportSink, SessionReport, SessionStore, StoreError};

use super::locks::SessionLocks;
use super::summary::engagement_summary;

/// Version-conflict retries per commit before giving up.
const COMMIT_RETRIES: u32 = 3;

/// Reply sent for messages addressed to an already-ended session.
const ENDED_SESSION_REPLY: &str = "Thanks, I have everything I need for now.";

/// Reply sent when triage decides the sender is not a scammer.
const HUMAN_REPLY: &str = "Sorry, I think you have the wrong number.";

/// One inbound message, already validated by the transport layer.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub session_id: Option<SessionId>,
    pub text: String,
    pub metadata: ChannelMetadata,
}

/// Result of processing one inbound message.
#[derive(Debug, Clone)]
pub struct EngagementOutcome {
    pub scam_detected: bool,
    pub reply: String,
    pub session_id: Option<SessionId>,
    pub status: Option<SessionStatus>,
    pub extracted_intelligence: Option<Intelligence>,
    pub engagement_metrics: Option<EngagementMetrics>,
}

impl EngagementOutcome {
    fn human() -> Self {
        Self {
            scam_detected: false,
            reply: HUMAN_REPLY.to_string(),
            session_id: None,
            status: None,
            extracted_intelligence: None,
            engagement_metrics: None,
        }
    }

    fn from_session(session: &Session, reply: String) -> Self {
        let now = Timestamp::now();
        Self {
            scam_detected: true,
            reply,
            session_id: Some(session.session_id().clone()),
            status: Some(session.status()),
            extracted_intelligence: Some(session.intelligence().clone()),
            engagement_metrics: Some(EngagementMetrics {
                engagement_duration_seconds: session.engagement_duration_secs(&now),
                total_messages_exchanged: session.total_messages(),
            }),
        }
    }
}

/// Central application service wiring the pipeline stages together.
pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    sink: Arc<dyn ReportSink>,
    locks: Arc<SessionLocks>,
    classifier: Classifier,
    extraction: ExtractionEngine,
    agent: ConversationalAgent,
    end_detector: EndDetector,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        sink: Arc<dyn ReportSink>,
        locks: Arc<SessionLocks>,
        extraction: ExtractionEngine,
        agent: ConversationalAgent,
        end_detector: EndDetector,
    ) -> Self {
        Self {
            store,
            sink,
            locks,
            classifier: Classifier::new(),
            extraction,
            agent,
            end_detector,
        }
    }

    /// Processes one inbound message end to end.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty message body
    /// - `StorageError`/`ConcurrencyConflict` when persistence fails
    pub async fn handle_message(
        &self,
        message: InboundMessage,
    ) -> Result<EngagementOutcome, DomainError> {
        if message.text.trim().is_empty() {
            return Err(DomainError::validation(
                "text",
                "message text must not be empty",
            ));
        }

        let session_id = message
            .session_id
            .clone()
            .unwrap_or_else(SessionId::generate);
        let _guard = self.locks.acquire(&session_id).await;

        let existing = self
            .store
            .find(&session_id)
            .await
            .map_err(map_store_error)?;

        let mut session = match existing {
            Some(session) if session.status().is_ended() => {
                // Terminal sessions absorb further messages without mutation.
                info!(session_id = %session_id, "message for ended session, returning snapshot");
                return Ok(EngagementOutcome::from_session(
                    &session,
                    ENDED_SESSION_REPLY.to_string(),
                ));
            }
            Some(session) => session,
            None => {
                let classification = self.classifier.classify(&message.text);
                if !classification.is_scam() {
                    info!(
                        confidence = classification.confidence,
                        "triage verdict: human, no session created"
                    );
                    return Ok(EngagementOutcome::human());
                }
                info!(
                    session_id = %session_id,
                    scam_type = ?classification.scam_type,
                    confidence = classification.confidence,
                    "triage verdict: scam, session created"
                );
                let session = Session::new(
                    session_id.clone(),
                    message.metadata.clone(),
                    classification.scam_type,
                    classification.confidence,
                    classification.threat,
                );
                self.store.insert(&session).await.map_err(map_store_error)?;
                session
            }
        };

        self.process_turn(&mut session, &message.text).await?;
        let reply = session
            .conversation_history()
            .last()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        Ok(EngagementOutcome::from_session(&session, reply))
    }

    /// Runs the engagement stages for one scammer turn.
    ///
    /// Committed after every stage: an extraction merge that reached the
    /// store survives any later failure in the same turn.
    async fn process_turn(&self, session: &mut Session, text: &str) -> Result<(), DomainError> {
        session.record_scammer_turn(text)?;
        self.commit(session).await?;

        let delta = self
            .extraction
            .extract(text, session.conversation_history())
            .await;
        session.merge_intelligence(&delta)?;
        self.commit(session).await?;

        let agent_reply = self.agent.reply(session, text).await;
        if let Some(ref template_id) = agent_reply.template_id {
            session.mark_template_used(template_id.clone());
        }

        if let Some(reason) = self.end_detector.evaluate(session) {
            self.finalize(session, reason).await;
        }

        session.record_honeypot_turn(agent_reply.text)?;
        self.commit(session).await?;
        Ok(())
    }

    /// Applies the finalize decision: first trigger submits the report and
    /// latches; later triggers are no-ops. The session keeps engaging.
    async fn finalize(&self, session: &mut Session, reason: EndReason) {
        session.refine_notes(engagement_summary(session, reason));
        if !session.mark_finalized() {
            return;
        }
        info!(
            session_id = %session.session_id(),
            reason = ?reason,
            "finalize triggered, submitting report"
        );
        let report = SessionReport::from_session(session, &Timestamp::now());
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(err) = sink.submit(&report).await {
                error!(session_id = %report.session_id, error = %err, "report submission failed");
            }
        });
    }

    /// Force-ends a session, submitting the report first if it never was.
    ///
    /// Shares the termination path with the timeout sweeper.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` on lookup miss
    /// - `SessionEnded` if the session already ended
    pub async fn force_end(
        &self,
        id: &SessionId,
        reason: EndReason,
    ) -> Result<Session, DomainError> {
        let _guard = self.locks.acquire(id).await;
        let mut session = self
            .store
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::session_not_found(id))?;

        if session.status().is_ended() {
            return Err(DomainError::new(
                ErrorCode::SessionEnded,
                "session already ended",
            )
            .with_detail("session_id", id.as_str()));
        }

        self.terminate(&mut session, reason).await?;
        Ok(session)
    }

    /// Terminal transition shared by force-end and the sweeper: submit the
    /// report if the finalize latch never fired, then mark Ended.
    pub(crate) async fn terminate(
        &self,
        session: &mut Session,
        reason: EndReason,
    ) -> Result<(), DomainError> {
        let summary = engagement_summary(session, reason);
        if session.mark_finalized() {
            session.refine_notes(&summary);
            let report = SessionReport::from_session(session, &Timestamp::now());
            if let Err(err) = self.sink.submit(&report).await {
                error!(session_id = %report.session_id, error = %err, "report submission failed");
            }
        }
        session.end(reason, summary)?;
        self.commit(session).await?;
        info!(session_id = %session.session_id(), reason = ?reason, "session ended");
        Ok(())
    }

    pub async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        self.store.find(id).await.map_err(map_store_error)
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>, DomainError> {
        self.store.list().await.map_err(map_store_error)
    }

    pub(crate) fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub(crate) fn locks(&self) -> &Arc<SessionLocks> {
        &self.locks
    }

    /// Version-checked write with bounded conflict retry.
    ///
    /// The per-session lock makes genuine conflicts rare; when one does
    /// surface, the stored record is re-read and the write retried unless
    /// the session ended underneath us.
    async fn commit(&self, session: &mut Session) -> Result<(), DomainError> {
        let mut last_conflict = None;
        for attempt in 0..COMMIT_RETRIES {
            match self.store.update(session).await {
                Ok(version) => {
                    session.set_version(version);
                    return Ok(());
                }
                Err(err) if err.is_conflict() => {
                    warn!(
                        session_id = %session.session_id(),
                        attempt = attempt + 1,
                        "commit conflict, reloading"
                    );
                    let stored = self
                        .store
                        .find(session.session_id())
                        .await
                        .map_err(map_store_error)?
                        .ok_or_else(|| DomainError::session_not_found(session.session_id()))?;
                    if stored.status().is_ended() {
                        return Err(DomainError::new(
                            ErrorCode::SessionEnded,
                            "session ended during processing",
                        ));
                    }
                    session.set_version(stored.version());
                    last_conflict = Some(err);
                    tokio::time::sleep(Duration::from_millis(10 * u64::from(attempt + 1))).await;
                }
                Err(err) => return Err(map_store_error(err)),
            }
        }
        Err(map_store_error(last_conflict.unwrap_or_else(|| {
            StoreError::Backend("commit retries exhausted".into())
        })))
    }
}

fn map_store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound(id) => DomainError::session_not_found(&id),
        StoreError::Conflict { .. } => DomainError::new(
            ErrorCode::ConcurrencyConflict,
            "session was modified concurrently, retry the request",
        ),
        other => DomainError::new(ErrorCode::StorageError, other.to_string()),
    }
}
