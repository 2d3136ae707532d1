//! Service entry point: configuration, wiring, and the axum server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use scambait::adapters::http::{api_routes, EngagementHandlers};
use scambait::adapters::llm::{
    ChatProviderConfig, HttpChatProvider, ProviderSlot, ResilientLlmClient, RotationPolicy,
};
use scambait::adapters::report::{HttpReportSink, ReportSinkConfig};
use scambait::adapters::store::InMemorySessionStore;
use scambait::application::{Orchestrator, SessionLocks, TimeoutSweeper};
use scambait::config::AppConfig;
use scambait::domain::engagement::{ConversationalAgent, EndDetector};
use scambait::domain::extraction::ExtractionEngine;
use scambait::ports::{Credential, LlmCaller, ReportSink, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    config.validate()?;

    let caller = build_llm_client(&config)?;
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let sink: Arc<dyn ReportSink> = build_report_sink(&config)?;
    let locks = Arc::new(SessionLocks::new());

    let orchestrator = Arc::new(Orchestrator::new(
        store,
        sink,
        locks,
        ExtractionEngine::new(caller.clone()),
        ConversationalAgent::new(caller, config.engagement.trust_turns),
        EndDetector::new(config.engagement.end_policy()),
    ));

    let sweeper = TimeoutSweeper::new(orchestrator.clone(), config.engagement.sweeper_config());
    tokio::spawn(sweeper.run());

    let app = api_routes(EngagementHandlers::new(orchestrator));
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assembles the failover client from every configured provider and key.
fn build_llm_client(config: &AppConfig) -> Result<Arc<dyn LlmCaller>, Box<dyn std::error::Error>> {
    let mut slots = Vec::new();

    let groq_keys = config.providers.groq_keys();
    if !groq_keys.is_empty() {
        let provider = HttpChatProvider::new(
            ChatProviderConfig::new("groq", config.providers.groq_base_url.clone())
                .with_model(config.providers.groq_model.clone())
                .with_timeout(config.providers.attempt_timeout()),
        )?;
        slots.push(ProviderSlot::new(
            Arc::new(provider),
            label_keys("groq", &groq_keys),
        ));
    }

    let mistral_keys = config.providers.mistral_keys();
    if !mistral_keys.is_empty() {
        let provider = HttpChatProvider::new(
            ChatProviderConfig::new("mistral", config.providers.mistral_base_url.clone())
                .with_model(config.providers.mistral_model.clone())
                .with_timeout(config.providers.attempt_timeout()),
        )?;
        slots.push(ProviderSlot::new(
            Arc::new(provider),
            label_keys("mistral", &mistral_keys),
        ));
    }

    info!(providers = slots.len(), "llm failover chain assembled");
    Ok(Arc::new(ResilientLlmClient::new(
        slots,
        RotationPolicy {
            attempt_timeout: config.providers.attempt_timeout(),
            attempt_delay: config.providers.attempt_delay(),
        },
    )))
}

fn label_keys(provider: &str, keys: &[String]) -> Vec<Credential> {
    keys.iter()
        .enumerate()
        .map(|(i, key)| Credential::new(format!("{}-key-{}", provider, i + 1), key.clone()))
        .collect()
}

fn build_report_sink(config: &AppConfig) -> Result<Arc<dyn ReportSink>, Box<dyn std::error::Error>> {
    let endpoint = config
        .report
        .endpoint
        .clone()
        .unwrap_or_default();
    let sink = HttpReportSink::new(
        ReportSinkConfig::new(endpoint).with_timeout(config.report.timeout()),
    )?;
    Ok(Arc::new(sink))
}
