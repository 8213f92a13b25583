//! Failure observer port
//!
//! The orchestrator owns alerting. The pipeline runner only reports that a
//! step failed through this interface; what happens next (notifications,
//! retries) is the caller's business. Keeping it a trait keeps the core
//! testable without a live orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::PipelineState;

/// Everything an orchestrator needs to surface a failed step
#[derive(Debug, Clone, Serialize)]
pub struct FailureNotice {
    /// Identifier of the run that failed
    pub run_id: String,
    /// State the pipeline was in when the step failed
    pub state: PipelineState,
    /// When the failure was observed
    pub occurred_at: DateTime<Utc>,
    /// Rendered error, including the failure kind prefix
    pub error: String,
}

impl FailureNotice {
    pub fn new(run_id: impl Into<String>, state: PipelineState, error: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            state,
            occurred_at: Utc::now(),
            error: error.into(),
        }
    }
}

/// Failure observer trait
///
/// Implementations receive a notice for every failed step of a run. They
/// must not panic and should not block for long; the error still propagates
/// to the caller regardless of what the observer does.
pub trait FailureObserver: Send + Sync {
    fn on_step_failure(&self, notice: &FailureNotice);
}

/// Observer that ignores every notice
///
/// Default for callers that rely on error propagation alone.
pub struct NullObserver;

impl FailureObserver for NullObserver {
    fn on_step_failure(&self, _notice: &FailureNotice) {}
}
