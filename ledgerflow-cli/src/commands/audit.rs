//! Audit command - list transactions whose debits and credits do not balance

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{build_context, load_config};
use crate::output;

pub fn run(limit: Option<u32>, out: Option<PathBuf>, json: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(n) = limit {
        config.imbalance_limit = n;
    }

    let ctx = build_context(config)?;
    let result = ctx.audit_service.imbalanced_transactions()?;

    if let Some(path) = out {
        std::fs::write(&path, result.to_json()?)
            .with_context(|| format!("Failed to write result set to {:?}", path))?;
        output::success(&format!(
            "Wrote {} imbalanced transaction(s) to {}",
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
        output::success("All transactions balance");
        return Ok(());
    }

    output::warning(&format!(
        "{} transaction(s) with mismatched debits and credits:",
        result.row_count
    ));
    output::print_resultset(&result);

    Ok(())
}
