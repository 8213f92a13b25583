//! LedgerFlow CLI - Batch financial data migration in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{audit, ingest, init, logs, pipeline, query, report, status, summary, transform};

/// LedgerFlow - batch financial data migration in your terminal
#[derive(Parser)]
#[command(name = "ledgerflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the workspace directory and default settings
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the account and journal CSV batches into the store
    Ingest {
        /// Path to the accounts CSV (overrides settings)
        #[arg(long)]
        accounts: Option<PathBuf>,
        /// Path to the journal entries CSV (overrides settings)
        #[arg(long)]
        journal: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the transformed table and enforce the quality gate
    Transform {
        /// Calendar year considered valid (overrides settings)
        #[arg(long)]
        valid_year: Option<i32>,
        /// Invalid-row fraction above which the run fails (overrides settings)
        #[arg(long)]
        threshold: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions whose debits and credits do not balance
    Audit {
        /// Maximum number of transactions to list (overrides settings)
        #[arg(long)]
        limit: Option<u32>,
        /// Write the result set as JSON to a file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize final balances per account over valid entries
    Summary {
        /// Write the result set as JSON to a file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the migration report from both aggregations
    Report {
        /// Read imbalanced transactions from a JSON file instead of the store
        #[arg(long)]
        imbalanced: Option<PathBuf>,
        /// Read the account summary from a JSON file instead of the store
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the whole pipeline from ingest to report
    Run {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show store status and row counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Execute SQL query against the store
    Query {
        /// SQL query to execute
        sql: Option<String>,
        /// Read SQL from file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: String,
        /// Output as JSON (shorthand for --format json)
        #[arg(long)]
        json: bool,
    },

    /// View and manage pipeline logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force, json } => init::run(force, json),
        Commands::Ingest { accounts, journal, json } => ingest::run(accounts, journal, json),
        Commands::Transform { valid_year, threshold, json } => {
            transform::run(valid_year, threshold, json)
        }
        Commands::Audit { limit, out, json } => audit::run(limit, out, json),
        Commands::Summary { out, json } => summary::run(out, json),
        Commands::Report { imbalanced, summary, json } => report::run(imbalanced, summary, json),
        Commands::Run { json } => pipeline::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Query { sql, file, format, json } => {
            let fmt = if json { "json".to_string() } else { format };
            query::run(sql.as_deref(), file.as_deref(), &fmt)
        }
        Commands::Logs { command } => logs::run(command),
    }
}
