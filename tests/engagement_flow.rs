//! End-to-end engagement flows over the public API, with scripted providers.

use std::sync::Arc;
use std::time::Duration;

use scambait::adapters::llm::{
    MockLlmProvider, MockOutcome, ProviderSlot, ResilientLlmClient, RotationPolicy,
};
use scambait::adapters::report::RecordingReportSink;
use scambait::adapters::store::InMemorySessionStore;
use scambait::application::{
    InboundMessage, Orchestrator, SessionLocks, SweeperConfig, TimeoutSweeper,
};
use scambait::domain::engagement::{ConversationalAgent, EndDetector, EndPolicy};
use scambait::domain::extraction::ExtractionEngine;
use scambait::domain::foundation::{EndReason, SessionId, SessionStatus};
use scambait::domain::session::{ChannelMetadata, IntelCategory};
use scambait::ports::{Credential, LlmCaller};

fn caller_with(outcomes: Vec<MockOutcome>) -> Arc<dyn LlmCaller> {
    let provider = MockLlmProvider::new("groq").with_outcomes(outcomes);
    Arc::new(ResilientLlmClient::new(
        vec![ProviderSlot::new(
            provider,
            vec![Credential::new("key-1", "secret")],
        )],
        RotationPolicy {
            attempt_timeout: Duration::from_secs(5),
            attempt_delay: Duration::from_millis(0),
        },
    ))
}

fn orchestrator(sink: Arc<RecordingReportSink>, outcomes: Vec<MockOutcome>) -> Arc<Orchestrator> {
    let caller = caller_with(outcomes);
    Arc::new(Orchestrator::new(
        Arc::new(InMemorySessionStore::new()),
        sink,
        Arc::new(SessionLocks::new()),
        ExtractionEngine::new(caller.clone()),
        ConversationalAgent::new(caller, 2),
        EndDetector::new(EndPolicy::default()),
    ))
}

fn message(session_id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        session_id: Some(SessionId::new(session_id).unwrap()),
        text: text.to_string(),
        metadata: ChannelMetadata::default(),
    }
}

fn replies(n: usize) -> Vec<MockOutcome> {
    vec![MockOutcome::Reply("Oh wow, how do I proceed?".into()); n]
}

#[tokio::test]
async fn lottery_scam_engages_and_finalizes_on_two_categories() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink.clone(), replies(12));

    // First contact: suspicious link only.
    let outcome = orch
        .handle_message(message(
            "scam-1",
            "Congratulations! You won a lottery prize. Claim now at http://bit.ly/claim-prize",
        ))
        .await
        .unwrap();
    assert!(outcome.scam_detected);
    assert_eq!(outcome.status, Some(SessionStatus::Active));
    let intel = outcome.extracted_intelligence.unwrap();
    assert!(intel
        .category(IntelCategory::PhishingLinks)
        .contains("http://bit.ly/claim-prize"));
    assert_eq!(sink.submission_count(), 0);

    // Second turn adds a phone number: two categories, finalize fires.
    let outcome = orch
        .handle_message(message("scam-1", "Call our claims officer at +91-9876543210 now"))
        .await
        .unwrap();
    assert!(outcome.scam_detected);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.submission_count(), 1);

    let report = &sink.submitted()[0];
    assert!(report.scam_detected);
    assert_eq!(report.session_id.as_str(), "scam-1");
    assert_eq!(report.total_messages_exchanged, 2);
    assert!(report
        .extracted_intelligence
        .category(IntelCategory::PhoneNumbers)
        .contains("+919876543210"));
    assert!(!report.agent_notes.is_empty());

    // The session keeps engaging after the report goes out.
    let session = orch
        .get_session(&SessionId::new("scam-1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Active);
    assert!(session.is_finalized());
}

#[tokio::test]
async fn human_small_talk_is_never_engaged() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink.clone(), replies(2));

    let outcome = orch
        .handle_message(InboundMessage {
            session_id: None,
            text: "hey, are we still meeting for coffee tomorrow?".into(),
            metadata: ChannelMetadata::default(),
        })
        .await
        .unwrap();

    assert!(!outcome.scam_detected);
    assert!(outcome.session_id.is_none());
    assert!(orch.list_sessions().await.unwrap().is_empty());
    assert_eq!(sink.submission_count(), 0);
}

#[tokio::test]
async fn repeated_message_does_not_duplicate_intelligence() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink, replies(12));

    let text = "Transfer the fee to account number 123456789012 immediately";
    orch.handle_message(message("scam-1", text)).await.unwrap();
    orch.handle_message(message("scam-1", text)).await.unwrap();

    let session = orch
        .get_session(&SessionId::new("scam-1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.total_messages(), 2);
    assert_eq!(
        session
            .intelligence()
            .category(IntelCategory::BankAccounts)
            .len(),
        1
    );
}

#[tokio::test]
async fn provider_outage_still_produces_a_reply() {
    let sink = Arc::new(RecordingReportSink::new());
    // Every provider attempt fails; extraction degrades and the agent
    // falls back to a template.
    let orch = orchestrator(sink, vec![MockOutcome::Unavailable; 10]);

    let outcome = orch
        .handle_message(message(
            "scam-1",
            "Your account is blocked! Pay to scammer@paytm urgently",
        ))
        .await
        .unwrap();

    assert!(outcome.scam_detected);
    assert!(!outcome.reply.is_empty());
    let intel = outcome.extracted_intelligence.unwrap();
    assert!(intel
        .category(IntelCategory::UpiIds)
        .contains("scammer@paytm"));
}

#[tokio::test]
async fn fallback_replies_do_not_repeat_within_a_session() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink, vec![MockOutcome::Unavailable; 30]);

    let mut seen = Vec::new();
    for i in 0..3 {
        let outcome = orch
            .handle_message(message("scam-1", &format!("verify your account now ({i})")))
            .await
            .unwrap();
        seen.push(outcome.reply);
    }
    assert_eq!(seen.len(), 3);
    assert_ne!(seen[0], seen[1]);
    assert_ne!(seen[1], seen[2]);
}

#[tokio::test]
async fn idle_sessions_are_swept_and_reported_once() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink.clone(), replies(4));

    orch.handle_message(message("scam-1", "your KYC is suspended, verify immediately"))
        .await
        .unwrap();

    let sweeper = TimeoutSweeper::new(
        orch.clone(),
        SweeperConfig {
            interval: Duration::from_secs(5),
            inactivity_secs: 0,
        },
    );
    sweeper.sweep_once().await;
    sweeper.sweep_once().await;

    let session = orch
        .get_session(&SessionId::new("scam-1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Ended);
    assert_eq!(session.end_reason(), Some(EndReason::Timeout));
    assert_eq!(sink.submission_count(), 1);
}

#[tokio::test]
async fn messages_after_termination_return_the_final_snapshot() {
    let sink = Arc::new(RecordingReportSink::new());
    let orch = orchestrator(sink.clone(), replies(4));

    orch.handle_message(message("scam-1", "urgent: verify your blocked account"))
        .await
        .unwrap();
    orch.force_end(&SessionId::new("scam-1").unwrap(), EndReason::MaxMessages)
        .await
        .unwrap();
    assert_eq!(sink.submission_count(), 1);

    let outcome = orch
        .handle_message(message("scam-1", "hello?? reply urgently"))
        .await
        .unwrap();
    assert_eq!(outcome.status, Some(SessionStatus::Ended));

    let session = orch
        .get_session(&SessionId::new("scam-1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.total_messages(), 1);
    assert_eq!(sink.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failover_walks_keys_in_order_with_spacing() {
    let groq = MockLlmProvider::new("groq").with_outcomes(vec![
        MockOutcome::RateLimited,
        MockOutcome::Unavailable,
    ]);
    let mistral =
        MockLlmProvider::new("mistral").with_outcomes(vec![MockOutcome::Reply("done".into())]);

    let client = ResilientLlmClient::new(
        vec![
            ProviderSlot::new(
                groq.clone(),
                vec![
                    Credential::new("groq-key-1", "a"),
                    Credential::new("groq-key-2", "b"),
                ],
            ),
            ProviderSlot::new(mistral.clone(), vec![Credential::new("mistral-key-1", "c")]),
        ],
        RotationPolicy {
            attempt_timeout: Duration::from_secs(5),
            attempt_delay: Duration::from_millis(100),
        },
    );

    let started = tokio::time::Instant::now();
    let response = client
        .call(scambait::ports::ChatRequest::new())
        .await
        .unwrap();

    assert_eq!(response.provider, "mistral");
    assert_eq!(groq.credential_labels(), vec!["groq-key-1", "groq-key-2"]);
    assert_eq!(mistral.credential_labels(), vec!["mistral-key-1"]);
    // Two failed attempts impose two inter-attempt delays.
    assert!(started.elapsed() >= Duration::from_millis(200));
}
