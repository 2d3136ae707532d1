//! Report submission adapters.

mod http_sink;
mod memory;

pub use http_sink::{HttpReportSink, ReportSinkConfig};
pub use memory::RecordingReportSink;
