//! Report submission configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Reporting endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Submission URL of the evaluation platform.
    pub endpoint: Option<String>,

    /// Submission timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ReportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate report configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.endpoint.as_deref() {
            None | Some("") => Err(ValidationError::MissingRequired("report.endpoint")),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                Err(ValidationError::InvalidReportEndpoint)
            }
            Some(_) => Ok(()),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
