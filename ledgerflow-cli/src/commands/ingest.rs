//! Ingest command - load the account and journal CSV batches into the store

use std::path::PathBuf;

use anyhow::Result;
use ledgerflow_core::LogEvent;

use super::{build_context, get_logger, load_config, log_event};
use crate::output;

pub fn run(accounts: Option<PathBuf>, journal: Option<PathBuf>, json: bool) -> Result<()> {
    let logger = get_logger();

    let mut config = load_config()?;
    if let Some(path) = accounts {
        config.accounts_csv = path;
    }
    if let Some(path) = journal {
        config.journal_csv = path;
    }

    let ctx = build_context(config)?;

    match ctx.ingest_service.ingest() {
        Ok(result) => {
            log_event(&logger, LogEvent::new("ingest_completed").with_command("ingest"));

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            output::success(&format!(
                "Loaded {} account(s) and {} journal entr{} into the store",
                result.accounts_loaded,
                result.journal_entries_loaded,
                if result.journal_entries_loaded == 1 { "y" } else { "ies" }
            ));
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("ingest_failed")
                    .with_command("ingest")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}
