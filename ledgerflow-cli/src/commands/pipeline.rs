//! Run command - execute the whole pipeline from ingest to report

use anyhow::Result;
use colored::Colorize;
use ledgerflow_core::{FailureNotice, FailureObserver, LogEvent, LoggingService};

use super::{get_context, get_logger, log_event};
use crate::output;

/// Prints an alert and records the failure when a pipeline step errors
struct AlertingObserver {
    logger: Option<LoggingService>,
}

impl FailureObserver for AlertingObserver {
    fn on_step_failure(&self, notice: &FailureNotice) {
        eprintln!();
        eprintln!("{}", "PIPELINE FAILURE".red().bold());
        eprintln!("  Run:    {}", notice.run_id);
        eprintln!("  Step:   {}", notice.state);
        eprintln!("  At:     {}", notice.occurred_at.to_rfc3339());
        eprintln!("  Error:  {}", notice.error);
        eprintln!("  See 'ledgerflow logs list --errors' for history");
        eprintln!();

        log_event(
            &self.logger,
            LogEvent::new("run_failed")
                .with_run_id(&notice.run_id)
                .with_step(notice.state.as_str())
                .with_error(&notice.error),
        );
    }
}

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("run_started").with_command("run"));

    let ctx = get_context()?;
    let observer = AlertingObserver { logger };

    let summary = ctx.pipeline_service.run_with_observer(&observer)?;

    log_event(
        &observer.logger,
        LogEvent::new("run_completed")
            .with_run_id(&summary.run_id)
            .with_command("run"),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::success(&format!("Pipeline run {} completed", summary.run_id));
    println!(
        "  Ingested:  {} account(s), {} journal entr{}",
        summary.ingest.accounts_loaded,
        summary.ingest.journal_entries_loaded,
        if summary.ingest.journal_entries_loaded == 1 { "y" } else { "ies" }
    );
    println!(
        "  Quality:   {} of {} row(s) invalid ({:.2}%, threshold {:.2}%)",
        summary.transform.invalid_rows,
        summary.transform.total_rows,
        summary.transform.invalid_fraction * 100.0,
        summary.transform.threshold * 100.0
    );
    println!(
        "  Findings:  {} imbalanced transaction(s), {} account(s) summarized",
        summary.imbalanced_transactions, summary.summarized_accounts
    );
    println!("  Report:    {}", summary.report_path.display());
    println!("  Duration:  {} ms", summary.duration_ms);

    Ok(())
}
