//! Recording report sink for tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::{ReportError, ReportSink, SessionReport};

/// Collects submitted reports; optionally fails every submission.
#[derive(Default)]
pub struct RecordingReportSink {
    reports: Mutex<Vec<SessionReport>>,
    fail: bool,
}

impl RecordingReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose submissions always fail.
    pub fn failing() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn submitted(&self) -> Vec<SessionReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportSink for RecordingReportSink {
    async fn submit(&self, report: &SessionReport) -> Result<(), ReportError> {
        if self.fail {
            return Err(ReportError::Submission("recording sink set to fail".into()));
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
