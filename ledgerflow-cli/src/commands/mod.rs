//! CLI command implementations

pub mod audit;
pub mod ingest;
pub mod init;
pub mod logs;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod status;
pub mod summary;
pub mod transform;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerflow_core::config::PipelineConfig;
use ledgerflow_core::{LogEvent, LoggingService, PipelineContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let workspace_dir = get_workspace_dir();
    // Ensure directory exists
    std::fs::create_dir_all(&workspace_dir).ok()?;
    LoggingService::new(&workspace_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the ledgerflow workspace directory from environment or default
pub fn get_workspace_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEDGERFLOW_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".ledgerflow")
    }
}

/// Load the workspace settings without building a context
///
/// Commands that override individual settings from flags mutate the
/// returned config and then build the context themselves.
pub fn load_config() -> Result<PipelineConfig> {
    let workspace_dir = get_workspace_dir();

    std::fs::create_dir_all(&workspace_dir)
        .with_context(|| format!("Failed to create workspace directory: {:?}", workspace_dir))?;

    PipelineConfig::load(&workspace_dir)
        .with_context(|| format!("Failed to load settings from {:?}", workspace_dir))
}

/// Get or create the pipeline context
pub fn get_context() -> Result<PipelineContext> {
    let config = load_config()?;
    build_context(config)
}

/// Build a context from an already-loaded (possibly overridden) config
pub fn build_context(config: PipelineConfig) -> Result<PipelineContext> {
    PipelineContext::with_config(config).context("Failed to initialize pipeline context")
}
