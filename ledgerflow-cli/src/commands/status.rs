//! Status command - show store status and row counts

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "LedgerFlow Status".bold());
    println!();

    if !status.database_exists {
        println!("{}", "No database yet. Run 'ledgerflow ingest' to load a batch.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Accounts", &count_cell(status.accounts)]);
    table.add_row(vec!["Journal entries", &count_cell(status.journal_entries)]);
    table.add_row(vec!["Transformed entries", &count_cell(status.transformed_entries)]);
    table.add_row(vec!["  Valid", &count_cell(status.valid_entries)]);
    table.add_row(vec!["  Invalid", &count_cell(status.invalid_entries)]);

    println!("{}", table);
    println!();

    if let (Some(earliest), Some(latest)) = (
        &status.journal_date_range.earliest,
        &status.journal_date_range.latest,
    ) {
        println!("Journal dates: {} to {}", earliest, latest);
    }

    Ok(())
}

fn count_cell(count: Option<i64>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}
