//! Summary command - final balances per account over valid entries

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::get_context;
use crate::output;

pub fn run(out: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.summary_service.account_balances()?;

    if let Some(path) = out {
        std::fs::write(&path, result.to_json()?)
            .with_context(|| format!("Failed to write result set to {:?}", path))?;
        output::success(&format!(
            "Wrote {} account balance(s) to {}",
            result.row_count,
            path.display()
        ));
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.rows.is_empty() {
        output::info("No valid journal entries to summarize");
        return Ok(());
    }

    output::print_resultset(&result);
    println!();
    println!("{} account(s) summarized", result.row_count);

    Ok(())
}
