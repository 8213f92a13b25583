//! LedgerFlow Core - batch migration pipeline for double-entry ledger data
//!
//! This crate implements the pipeline logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Account, JournalEntry, PipelineState, ResultSet)
//! - **ports**: Trait definitions for external dependencies (FailureObserver)
//! - **services**: Pipeline steps and store inspection
//! - **adapters**: Concrete implementations (DuckDB store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbStore;
use config::PipelineConfig;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{Account, JournalEntry, PipelineState, ResultSet};
pub use ports::{FailureNotice, FailureObserver, NullObserver};
pub use services::{LogEvent, LoggingService};

/// Main context for pipeline operations
///
/// The primary entry point for all pipeline logic. It validates the
/// configuration once and holds the store handle plus all services.
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub store: Arc<DuckDbStore>,
    pub ingest_service: IngestService,
    pub transform_service: TransformService,
    pub audit_service: AuditService,
    pub summary_service: SummaryService,
    pub report_service: ReportService,
    pub pipeline_service: PipelineService,
    pub status_service: StatusService,
    pub query_service: QueryService,
}

impl PipelineContext {
    /// Create a context from the settings in the workspace directory
    pub fn new(workspace_dir: &Path) -> Result<Self> {
        let config = PipelineConfig::load(workspace_dir)?;
        Self::with_config(config)
    }

    /// Create a context from an already loaded configuration
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(DuckDbStore::new(&config));

        let ingest_service = IngestService::new(Arc::clone(&store), &config);
        let transform_service = TransformService::new(Arc::clone(&store), &config);
        let audit_service = AuditService::new(Arc::clone(&store), &config);
        let summary_service = SummaryService::new(Arc::clone(&store));
        let report_service = ReportService::new(&config);
        let pipeline_service = PipelineService::new(Arc::clone(&store), &config);
        let status_service = StatusService::new(Arc::clone(&store), &config);
        let query_service = QueryService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            ingest_service,
            transform_service,
            audit_service,
            summary_service,
            report_service,
            pipeline_service,
            status_service,
            query_service,
        })
    }
}
