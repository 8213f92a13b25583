//! Pipeline service - drives the steps of a migration run

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::adapters::duckdb::DuckDbStore;
use crate::config::PipelineConfig;
use crate::domain::result::Result;
use crate::domain::PipelineState;
use crate::ports::{FailureNotice, FailureObserver, NullObserver};
use crate::services::audit::AuditService;
use crate::services::ingest::{IngestResult, IngestService};
use crate::services::report::ReportService;
use crate::services::summary::SummaryService;
use crate::services::transform::{TransformResult, TransformService};

/// Pipeline service
///
/// Walks one run through ingest, transform, the two aggregations, and the
/// report. The first failing step ends the run; every step is a full
/// replace of its output, so the next run starts clean without any retry
/// bookkeeping here.
pub struct PipelineService {
    ingest: IngestService,
    transform: TransformService,
    audit: AuditService,
    summary: SummaryService,
    report: ReportService,
}

impl PipelineService {
    pub fn new(store: Arc<DuckDbStore>, config: &PipelineConfig) -> Self {
        Self {
            ingest: IngestService::new(store.clone(), config),
            transform: TransformService::new(store.clone(), config),
            audit: AuditService::new(store.clone(), config),
            summary: SummaryService::new(store),
            report: ReportService::new(config),
        }
    }

    /// Run the full pipeline without failure notifications
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with_observer(&NullObserver)
    }

    /// Run the full pipeline, reporting the failed step to the observer
    ///
    /// The notice carries the state the run was in when the step failed;
    /// the error itself still propagates to the caller.
    pub fn run_with_observer(&self, observer: &dyn FailureObserver) -> Result<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let mut state = PipelineState::Idle;

        state = state.advance();
        let ingest = observed(&run_id, state, observer, || self.ingest.ingest())?;

        state = state.advance();
        let transform = observed(&run_id, state, observer, || self.transform.transform())?;

        state = state.advance();
        let imbalanced = observed(&run_id, state, observer, || {
            self.audit.imbalanced_transactions()
        })?;
        let balances = observed(&run_id, state, observer, || {
            self.summary.account_balances()
        })?;

        state = state.advance();
        let report_path = observed(&run_id, state, observer, || {
            self.report.write_report(&imbalanced, &balances)
        })?;

        state = state.advance();

        Ok(RunSummary {
            run_id,
            final_state: state,
            ingest,
            transform,
            imbalanced_transactions: imbalanced.row_count,
            summarized_accounts: balances.row_count,
            report_path,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn observed<T>(
    run_id: &str,
    state: PipelineState,
    observer: &dyn FailureObserver,
    step: impl FnOnce() -> Result<T>,
) -> Result<T> {
    step().map_err(|e| {
        observer.on_step_failure(&FailureNotice::new(run_id, state, e.to_string()));
        e
    })
}

/// Outcome of a completed pipeline run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub final_state: PipelineState,
    pub ingest: IngestResult,
    pub transform: TransformResult,
    /// Imbalanced transactions found (after the cap)
    pub imbalanced_transactions: usize,
    /// Accounts in the balance summary
    pub summarized_accounts: usize,
    pub report_path: PathBuf,
    pub duration_ms: u64,
}
