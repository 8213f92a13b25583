//! Service layer - pipeline steps and store inspection
//!
//! Each pipeline step is its own service so the CLI can run steps
//! individually or let PipelineService drive a whole run.

pub mod audit;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod status;
pub mod summary;
pub mod transform;

pub use audit::AuditService;
pub use ingest::{IngestResult, IngestService};
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use pipeline::{PipelineService, RunSummary};
pub use query::QueryService;
pub use report::{render_report, ReportService};
pub use status::{DateRange, StatusReport, StatusService};
pub use summary::SummaryService;
pub use transform::{TransformResult, TransformService};
