//! Init command - create the workspace directory and default settings

use anyhow::{Context, Result};
use ledgerflow_core::LogEvent;

use super::{get_logger, get_workspace_dir, log_event};
use crate::output;

pub fn run(force: bool, json: bool) -> Result<()> {
    let workspace_dir = get_workspace_dir();

    std::fs::create_dir_all(&workspace_dir)
        .with_context(|| format!("Failed to create workspace directory: {:?}", workspace_dir))?;
    std::fs::create_dir_all(workspace_dir.join("data"))?;
    std::fs::create_dir_all(workspace_dir.join("output"))?;

    let settings_path = workspace_dir.join("settings.json");
    if settings_path.exists() && !force {
        anyhow::bail!(
            "Workspace already initialized at {} (use --force to overwrite settings)",
            workspace_dir.display()
        );
    }

    // Relative paths, so the workspace stays relocatable
    let settings = serde_json::json!({
        "dbPath": "ledgerflow.duckdb",
        "accountsCsv": "data/accounts.csv",
        "journalCsv": "data/journal_entries.csv",
        "reportPath": "output/migration_report.txt",
        "validYear": 2024,
        "invalidThreshold": 0.05,
        "imbalanceLimit": 10
    });
    std::fs::write(&settings_path, serde_json::to_string_pretty(&settings)?)
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;

    let logger = get_logger();
    log_event(&logger, LogEvent::new("workspace_initialized").with_command("init"));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "workspace_dir": workspace_dir,
                "settings_path": settings_path,
            }))?
        );
        return Ok(());
    }

    output::success(&format!("Initialized workspace at {}", workspace_dir.display()));
    println!("  Settings: {}", settings_path.display());
    println!("  Drop CSV batches into {}", workspace_dir.join("data").display());
    println!("  Then run 'ledgerflow run' to execute the pipeline");

    Ok(())
}
