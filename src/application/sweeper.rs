//! Background timeout sweeper.
//!
//! Periodically terminates sessions whose scammer went quiet. Each
//! candidate is handled under the same per-session lock the orchestrator
//! uses, with staleness re-checked after acquisition so an inbound message
//! that raced the sweep wins. One candidate failing never stops the rest.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::foundation::{EndReason, SessionStatus, Timestamp};

use super::orchestrator::Orchestrator;

/// Sweep scheduling parameters.
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    /// Pause between sweeps.
    pub interval: Duration,
    /// Inactivity threshold before a session counts as abandoned.
    pub inactivity_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            inactivity_secs: 15,
        }
    }
}

/// Terminates idle sessions in the background.
pub struct TimeoutSweeper {
    orchestrator: Arc<Orchestrator>,
    config: SweeperConfig,
}

impl TimeoutSweeper {
    pub fn new(orchestrator: Arc<Orchestrator>, config: SweeperConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Runs the sweep loop until the task is dropped.
    pub async fn run(self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            inactivity_secs = self.config.inactivity_secs,
            "timeout sweeper started"
        );
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// One sweep pass. Public so tests can drive it without the loop.
    pub async fn sweep_once(&self) {
        let now = Timestamp::now();
        let candidates = match self
            .orchestrator
            .store()
            .find_stale(&now, self.config.inactivity_secs)
            .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(error = %err, "stale-session scan failed");
                return;
            }
        };
        if candidates.is_empty() {
            return;
        }
        debug!(count = candidates.len(), "sweeping idle sessions");

        for candidate in candidates {
            let id = candidate.session_id().clone();
            if let Err(err) = self.sweep_session(&id).await {
                warn!(session_id = %id, error = %err, "sweep failed for session");
            }
        }
    }

    async fn sweep_session(
        &self,
        id: &crate::domain::foundation::SessionId,
    ) -> Result<(), crate::domain::foundation::DomainError> {
        let _guard = self.orchestrator.locks().acquire(id).await;

        // Re-validate: an inbound message may have landed while we waited.
        let Some(mut session) = self.orchestrator.get_session(id).await? else {
            return Ok(());
        };
        let now = Timestamp::now();
        if session.status() != SessionStatus::Active
            || !session.is_stale(&now, self.config.inactivity_secs)
        {
            debug!(session_id = %id, "session no longer stale, skipping");
            return Ok(());
        }

        session.begin_timeout()?;
        self.orchestrator
            .terminate(&mut session, EndReason::Timeout)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::{MockLlmProvider, MockOutcome, ProviderSlot, ResilientLlmClient, RotationPolicy};
    use crate::adapters::report::RecordingReportSink;
    use crate::adapters::store::InMemorySessionStore;
    use crate::application::locks::SessionLocks;
    use crate::application::orchestrator::{InboundMessage, Orchestrator};
    use crate::domain::engagement::{ConversationalAgent, EndDetector, EndPolicy};
    use crate::domain::extraction::ExtractionEngine;
    use crate::domain::foundation::SessionId;
    use crate::domain::session::ChannelMetadata;
    use crate::ports::{Credential, LlmCaller, SessionStore};

    fn build(sink: Arc<RecordingReportSink>) -> Arc<Orchestrator> {
        let provider = MockLlmProvider::new("groq")
            .with_outcomes(vec![MockOutcome::Reply("What next?".into()); 10]);
        let caller: Arc<dyn LlmCaller> = Arc::new(ResilientLlmClient::new(
            vec![ProviderSlot::new(provider, vec![Credential::new("key-1", "k")])],
            RotationPolicy {
                attempt_timeout: Duration::from_secs(5),
                attempt_delay: Duration::from_millis(0),
            },
        ));
        Arc::new(Orchestrator::new(
            Arc::new(InMemorySessionStore::new()),
            sink,
            Arc::new(SessionLocks::new()),
            ExtractionEngine::new(caller.clone()),
            ConversationalAgent::new(caller, 2),
            EndDetector::new(EndPolicy::default()),
        ))
    }

    async fn seed_session(orch: &Orchestrator, id: &str) {
        orch.handle_message(InboundMessage {
            session_id: Some(SessionId::new(id).unwrap()),
            text: "your account will be suspended, verify immediately".into(),
            metadata: ChannelMetadata::default(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn idle_session_is_ended_with_timeout_reason() {
        let sink = Arc::new(RecordingReportSink::new());
        let orch = build(sink.clone());
        seed_session(&orch, "s1").await;

        let sweeper = TimeoutSweeper::new(
            orch.clone(),
            SweeperConfig {
                interval: Duration::from_secs(5),
                inactivity_secs: 0,
            },
        );
        sweeper.sweep_once().await;

        let session = orch
            .get_session(&SessionId::new("s1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Ended);
        assert_eq!(session.end_reason(), Some(EndReason::Timeout));
        assert_eq!(sink.submission_count(), 1);
        assert!(!session.agent_notes().is_empty());
    }

    #[tokio::test]
    async fn active_session_within_threshold_is_left_alone() {
        let sink = Arc::new(RecordingReportSink::new());
        let orch = build(sink.clone());
        seed_session(&orch, "s1").await;

        let sweeper = TimeoutSweeper::new(orch.clone(), SweeperConfig::default());
        sweeper.sweep_once().await;

        let session = orch
            .get_session(&SessionId::new("s1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(sink.submission_count(), 0);
    }

    #[tokio::test]
    async fn repeat_sweeps_do_not_resubmit() {
        let sink = Arc::new(RecordingReportSink::new());
        let orch = build(sink.clone());
        seed_session(&orch, "s1").await;

        let sweeper = TimeoutSweeper::new(
            orch.clone(),
            SweeperConfig {
                interval: Duration::from_secs(5),
                inactivity_secs: 0,
            },
        );
        sweeper.sweep_once().await;
        sweeper.sweep_once().await;

        assert_eq!(sink.submission_count(), 1);
    }

    #[tokio::test]
    async fn sessions_claimed_elsewhere_are_skipped() {
        let sink = Arc::new(RecordingReportSink::new());
        let orch = build(sink.clone());
        seed_session(&orch, "s1").await;
        seed_session(&orch, "s2").await;

        // s1 is mid-timeout-processing, as after a crashed earlier sweep.
        let store = orch.store().clone();
        let mut s1 = store
            .find(&SessionId::new("s1").unwrap())
            .await
            .unwrap()
            .unwrap();
        s1.begin_timeout().unwrap();
        let v = store.update(&s1).await.unwrap();
        s1.set_version(v);

        let sweeper = TimeoutSweeper::new(
            orch.clone(),
            SweeperConfig {
                interval: Duration::from_secs(5),
                inactivity_secs: 0,
            },
        );
        sweeper.sweep_once().await;

        // s2 still got terminated.
        let s2 = orch
            .get_session(&SessionId::new("s2").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s2.status(), SessionStatus::Ended);
        assert_eq!(sink.submission_count(), 1);
    }
}
