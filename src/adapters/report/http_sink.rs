//! HTTP report sink.
//!
//! Posts the session summary to the external evaluation platform. One
//! bounded attempt per submission; callers treat failures as log-and-move-on.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::ports::{ReportError, ReportSink, SessionReport};

/// Configuration for the report endpoint.
#[derive(Debug, Clone)]
pub struct ReportSinkConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl ReportSinkConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// JSON-over-HTTP submission adapter.
pub struct HttpReportSink {
    config: ReportSinkConfig,
    client: Client,
}

impl HttpReportSink {
    pub fn new(config: ReportSinkConfig) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReportError::Submission(format!("http client init: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    async fn submit(&self, report: &SessionReport) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(report)
            .send()
            .await
            .map_err(|e| ReportError::Submission(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Submission(format!("HTTP {status}")));
        }
        info!(session_id = %report.session_id, "session report submitted");
        Ok(())
    }
}
