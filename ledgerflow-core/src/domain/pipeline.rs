//! Pipeline state machine

use serde::{Deserialize, Serialize};

/// Where a pipeline run currently stands
///
/// The happy path walks Idle, Ingesting, Transforming, Aggregating,
/// Reporting, Done. Transforming is the only state with a deliberate
/// business-rule exit (the quality gate); any state can end the run with an
/// infrastructure error. There are no failure states, failure handling
/// stays with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Ingesting,
    Transforming,
    Aggregating,
    Reporting,
    Done,
}

impl PipelineState {
    /// The state that follows this one on the happy path
    ///
    /// `Done` is terminal and advances to itself.
    pub fn advance(self) -> PipelineState {
        match self {
            PipelineState::Idle => PipelineState::Ingesting,
            PipelineState::Ingesting => PipelineState::Transforming,
            PipelineState::Transforming => PipelineState::Aggregating,
            PipelineState::Aggregating => PipelineState::Reporting,
            PipelineState::Reporting => PipelineState::Done,
            PipelineState::Done => PipelineState::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PipelineState::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Ingesting => "ingesting",
            PipelineState::Transforming => "transforming",
            PipelineState::Aggregating => "aggregating",
            PipelineState::Reporting => "reporting",
            PipelineState::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
