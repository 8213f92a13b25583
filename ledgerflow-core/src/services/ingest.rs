//! Ingest service - CSV source loading

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbStore;
use crate::config::PipelineConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, JournalEntry};

/// Ingest service for the two CSV sources
///
/// Each load is a full replace of its target table, so re-running after a
/// failure never duplicates rows. A malformed record fails the whole step;
/// silently dropping rows from a financial batch is not acceptable.
pub struct IngestService {
    store: Arc<DuckDbStore>,
    accounts_csv: PathBuf,
    journal_csv: PathBuf,
}

impl IngestService {
    pub fn new(store: Arc<DuckDbStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            accounts_csv: config.accounts_csv.clone(),
            journal_csv: config.journal_csv.clone(),
        }
    }

    /// Load both sources into the store
    pub fn ingest(&self) -> Result<IngestResult> {
        let accounts_loaded = self.load_accounts()?;
        let journal_entries_loaded = self.load_journal()?;
        Ok(IngestResult {
            accounts_loaded,
            journal_entries_loaded,
        })
    }

    /// Load the chart of accounts, replacing the accounts table
    pub fn load_accounts(&self) -> Result<usize> {
        let accounts = read_accounts(&self.accounts_csv)?;
        self.store.replace_accounts(&accounts)
    }

    /// Load the journal entries, replacing the journal table
    pub fn load_journal(&self) -> Result<usize> {
        let entries = read_journal_entries(&self.journal_csv)?;
        self.store.replace_journal_entries(&entries)
    }
}

/// Counts of rows loaded by an ingest run
#[derive(Debug, Serialize)]
pub struct IngestResult {
    /// Accounts loaded from the chart of accounts CSV
    pub accounts_loaded: usize,
    /// Entries loaded from the journal CSV
    pub journal_entries_loaded: usize,
}

fn read_accounts(path: &Path) -> Result<Vec<Account>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::ingestion(format!("cannot open {}: {}", path.display(), e)))?;

    let headers = reader.headers()?.clone();
    let number_idx = column_index(&headers, "account_number", path)?;
    let name_idx = column_index(&headers, "account_name", path)?;

    let mut accounts = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let record_no = idx + 1;

        let number_str = record.get(number_idx).unwrap_or("");
        let account_number: i64 = number_str.trim().parse().map_err(|_| {
            Error::ingestion(format!(
                "record {} of {}: invalid account_number '{}'",
                record_no,
                path.display(),
                number_str
            ))
        })?;

        if !seen.insert(account_number) {
            return Err(Error::ingestion(format!(
                "record {} of {}: duplicate account_number {}",
                record_no,
                path.display(),
                account_number
            )));
        }

        let account_name = record.get(name_idx).unwrap_or("").trim();
        if account_name.is_empty() {
            return Err(Error::ingestion(format!(
                "record {} of {}: empty account_name",
                record_no,
                path.display()
            )));
        }

        accounts.push(Account::new(account_number, account_name));
    }

    Ok(accounts)
}

fn read_journal_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::ingestion(format!("cannot open {}: {}", path.display(), e)))?;

    let headers = reader.headers()?.clone();
    let id_idx = column_index(&headers, "transaction_id", path)?;
    let date_idx = column_index(&headers, "transaction_date", path)?;
    let number_idx = column_index(&headers, "account_number", path)?;
    let amount_idx = column_index(&headers, "amount", path)?;

    let mut entries = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let record_no = idx + 1;

        let transaction_id = record.get(id_idx).unwrap_or("").trim();
        if transaction_id.is_empty() {
            return Err(Error::ingestion(format!(
                "record {} of {}: empty transaction_id",
                record_no,
                path.display()
            )));
        }

        let date_str = record.get(date_idx).unwrap_or("");
        let transaction_date = parse_date(date_str).ok_or_else(|| {
            Error::ingestion(format!(
                "record {} of {}: invalid transaction_date '{}'",
                record_no,
                path.display(),
                date_str
            ))
        })?;

        let number_str = record.get(number_idx).unwrap_or("");
        let account_number: i64 = number_str.trim().parse().map_err(|_| {
            Error::ingestion(format!(
                "record {} of {}: invalid account_number '{}'",
                record_no,
                path.display(),
                number_str
            ))
        })?;

        let amount_str = record.get(amount_idx).unwrap_or("");
        let amount = parse_amount(amount_str).ok_or_else(|| {
            Error::ingestion(format!(
                "record {} of {}: invalid amount '{}'",
                record_no,
                path.display(),
                amount_str
            ))
        })?;

        entries.push(JournalEntry::new(
            transaction_id,
            transaction_date,
            account_number,
            amount,
        ));
    }

    Ok(entries)
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        Error::ingestion(format!(
            "column '{}' not found in {}",
            name,
            path.display()
        ))
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Try common formats
    let formats = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

    let s = s.trim();
    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    // Handle parentheses notation for negative numbers: (100.00) -> -100.00
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    // Remove currency symbols, commas, whitespace
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut amount: Decimal = cleaned.parse().ok()?;

    // Apply parentheses negation
    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}
