//! Report command - render the migration report from both aggregations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgerflow_core::{LogEvent, ResultSet};

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(imbalanced: Option<PathBuf>, summary: Option<PathBuf>, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    // Result sets come from files written by `audit --out` / `summary --out`,
    // or straight from the store when no file is given
    let imbalanced_set = match imbalanced {
        Some(path) => read_resultset(&path)?,
        None => ctx.audit_service.imbalanced_transactions()?,
    };
    let summary_set = match summary {
        Some(path) => read_resultset(&path)?,
        None => ctx.summary_service.account_balances()?,
    };

    let report_path = ctx.report_service.write_report(&imbalanced_set, &summary_set)?;

    log_event(&logger, LogEvent::new("report_written").with_command("report"));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "report_path": report_path,
                "imbalanced_transactions": imbalanced_set.row_count,
                "summarized_accounts": summary_set.row_count,
            }))?
        );
        return Ok(());
    }

    output::success(&format!("Report written to {}", report_path.display()));
    println!(
        "  {} imbalanced transaction(s), {} account(s) summarized",
        imbalanced_set.row_count, summary_set.row_count
    );

    Ok(())
}

fn read_resultset(path: &Path) -> Result<ResultSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result set file: {:?}", path))?;
    ResultSet::from_json(&content)
        .with_context(|| format!("Failed to parse result set file: {:?}", path))
}
