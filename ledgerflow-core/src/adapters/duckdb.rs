//! DuckDB store implementation
//!
//! Every operation opens its own connection and drops it on return. Steps
//! run as separate orchestrator tasks, so the store never holds a long-lived
//! handle that would block the next process; read-only operations open with
//! `AccessMode::ReadOnly` so the two aggregation steps can run concurrently.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection};
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;

use crate::config::PipelineConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, JournalEntry, ResultSet};

/// Validate SQL syntax before execution to catch malformed queries early
fn validate_sql_syntax(sql: &str) -> Result<()> {
    let dialect = DuckDbDialect {};
    Parser::parse_sql(&dialect, sql).map_err(|e| {
        let msg = e.to_string();
        let cleaned = msg.trim_start_matches("sql parser error: ").to_string();
        Error::store(cleaned)
    })?;
    Ok(())
}

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
///
/// A writer from the previous step can still hold the file for a moment when
/// the orchestrator starts the next one.
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed pipeline store
///
/// Holds only the database path and table names; connections are per-call.
pub struct DuckDbStore {
    db_path: PathBuf,
    accounts_table: String,
    journal_table: String,
    transformed_table: String,
}

impl DuckDbStore {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            accounts_table: config.accounts_table.clone(),
            journal_table: config.journal_table.clone(),
            transformed_table: config.transformed_table.clone(),
        }
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a read-write connection, retrying briefly if the file is locked
    fn open(&self) -> Result<Connection> {
        self.open_with_mode(false)
    }

    /// Open a read-only connection (aggregations, status, ad-hoc queries)
    fn open_read_only(&self) -> Result<Connection> {
        self.open_with_mode(true)
    }

    fn open_with_mode(&self, read_only: bool) -> Result<Connection> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.try_open_connection(read_only) {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[ledgerflow] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::store(format!("failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    fn try_open_connection(&self, read_only: bool) -> Result<Connection> {
        // IMPORTANT: Disable extension autoloading to avoid macOS code signing issues
        // (cached extensions in ~/.duckdb/extensions may have different Team IDs)
        let mut config = duckdb::Config::default().enable_autoload_extension(false)?;
        if read_only {
            config = config.access_mode(duckdb::AccessMode::ReadOnly)?;
        }
        let conn = Connection::open_with_flags(&self.db_path, config)?;
        Ok(conn)
    }

    // === Ingestion: full-replace loads ===

    /// Replace the accounts table with the given reference data
    pub fn replace_accounts(&self, accounts: &[Account]) -> Result<usize> {
        let conn = self.open()?;

        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} (
                account_number BIGINT PRIMARY KEY,
                account_name   VARCHAR NOT NULL
            )",
            self.accounts_table
        ))?;

        let mut stmt = conn.prepare(&format!(
            "INSERT INTO {} (account_number, account_name) VALUES (?, ?)",
            self.accounts_table
        ))?;
        for account in accounts {
            stmt.execute(params![account.account_number, account.account_name])?;
        }

        Ok(accounts.len())
    }

    /// Replace the journal table with the given entries
    ///
    /// Amounts and dates are bound as strings and cast in SQL so DECIMAL and
    /// DATE columns keep exact values.
    pub fn replace_journal_entries(&self, entries: &[JournalEntry]) -> Result<usize> {
        let conn = self.open()?;

        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} (
                transaction_id   VARCHAR NOT NULL,
                transaction_date DATE NOT NULL,
                account_number   BIGINT NOT NULL,
                amount           DECIMAL(18,2) NOT NULL
            )",
            self.journal_table
        ))?;

        let mut stmt = conn.prepare(&format!(
            "INSERT INTO {} (transaction_id, transaction_date, account_number, amount)
             VALUES (?, CAST(? AS DATE), ?, CAST(? AS DECIMAL(18,2)))",
            self.journal_table
        ))?;
        for entry in entries {
            stmt.execute(params![
                entry.transaction_id,
                entry.transaction_date.to_string(),
                entry.account_number,
                entry.amount.to_string(),
            ])?;
        }

        Ok(entries.len())
    }

    // === Transform ===

    /// Rebuild the transformed table from the raw journal
    ///
    /// Left join keeps entries whose account is missing (null account_name).
    /// Sign-exclusive debit/credit derivation, except amount == 0 which lands
    /// as 0 in BOTH columns. A row is valid iff its date falls in the given
    /// year and the account exists. The year is validated configuration and
    /// is inlined because DDL does not take bound parameters.
    pub fn rebuild_transformed_entries(&self, valid_year: i32) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {transformed} AS
             SELECT
                 j.transaction_id,
                 j.transaction_date,
                 j.account_number,
                 a.account_name,
                 CASE WHEN j.amount >= 0 THEN j.amount ELSE NULL END AS debit_amount,
                 CASE WHEN j.amount <= 0 THEN -j.amount ELSE NULL END AS credit_amount,
                 CASE
                     WHEN EXTRACT(YEAR FROM j.transaction_date) = {year}
                          AND a.account_name IS NOT NULL
                     THEN TRUE
                     ELSE FALSE
                 END AS is_valid_transaction
             FROM {journal} j
             LEFT JOIN {accounts} a ON j.account_number = a.account_number",
            transformed = self.transformed_table,
            journal = self.journal_table,
            accounts = self.accounts_table,
            year = valid_year,
        ))?;

        Ok(())
    }

    /// Total and invalid row counts of the transformed table
    pub fn validity_counts(&self) -> Result<(i64, i64)> {
        let conn = self.open_read_only()?;

        let counts: (i64, i64) = conn.query_row(
            &format!(
                "SELECT
                    COUNT(*),
                    COALESCE(CAST(SUM(CASE WHEN is_valid_transaction THEN 0 ELSE 1 END) AS BIGINT), 0)
                 FROM {}",
                self.transformed_table
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(counts)
    }

    // === Aggregations ===

    /// Transactions whose summed debits and credits differ
    ///
    /// Runs over the raw journal, not the transformed table: an imbalanced
    /// transaction must surface even when its rows fail validity. Ordered by
    /// transaction_id so reports are stable run to run.
    pub fn imbalanced_transactions(&self, limit: u32) -> Result<ResultSet> {
        let conn = self.open_read_only()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT transaction_id
             FROM (
                 SELECT
                     transaction_id,
                     SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END) AS total_debit,
                     SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END) AS total_credit
                 FROM {}
                 GROUP BY transaction_id
             ) totals
             WHERE total_debit <> total_credit
             ORDER BY transaction_id
             LIMIT ?",
            self.journal_table
        ))?;

        collect_resultset(&mut stmt, &[&(limit as i64)])
    }

    /// Net balance per account over valid transformed entries, descending
    ///
    /// The balance is cast to VARCHAR so the hand-off carries the exact
    /// decimal rendering instead of a lossy float.
    pub fn account_balances(&self) -> Result<ResultSet> {
        let conn = self.open_read_only()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT b.account_name, CAST(b.balance AS VARCHAR) AS final_balance
             FROM (
                 SELECT
                     account_name,
                     COALESCE(SUM(debit_amount), 0) - COALESCE(SUM(credit_amount), 0) AS balance
                 FROM {}
                 WHERE is_valid_transaction
                 GROUP BY account_name
             ) b
             ORDER BY b.balance DESC, b.account_name ASC",
            self.transformed_table
        ))?;

        collect_resultset(&mut stmt, &[])
    }

    // === Ad-hoc queries ===

    /// Execute a read-only SQL statement against the store
    pub fn execute_query(&self, sql: &str) -> Result<ResultSet> {
        validate_sql_syntax(sql)?;

        // Only look at the first word after stripping whitespace
        let first_word = sql
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_uppercase();
        if first_word != "SELECT" && first_word != "WITH" {
            return Err(Error::store("only SELECT queries are allowed"));
        }

        // Also block write operations hiding in subqueries
        let sql_upper = sql.to_uppercase();
        let dangerous_patterns = [
            " INSERT ", " UPDATE ", " DROP ", " CREATE ", " ALTER ", " TRUNCATE ",
            "\nINSERT ", "\nUPDATE ", "\nDROP ", "\nCREATE ", "\nALTER ", "\nTRUNCATE ",
            "(INSERT ", "(UPDATE ", "(DROP ", "(CREATE ", "(ALTER ", "(TRUNCATE ",
        ];
        for pattern in dangerous_patterns {
            if sql_upper.contains(pattern) {
                return Err(Error::store("only SELECT queries are allowed"));
            }
        }

        let conn = self.open_read_only()?;
        let mut stmt = conn.prepare(sql)?;
        collect_resultset(&mut stmt, &[])
    }

    // === Introspection ===

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let conn = self.open_read_only()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_schema = 'main' AND table_name = ?",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Row count of a table
    pub fn row_count(&self, table_name: &str) -> Result<i64> {
        let conn = self.open_read_only()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table_name),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Earliest and latest journal dates, as ISO strings
    pub fn journal_date_range(&self) -> Result<(Option<String>, Option<String>)> {
        let conn = self.open_read_only()?;
        let range: (Option<String>, Option<String>) = conn.query_row(
            &format!(
                "SELECT MIN(transaction_date)::VARCHAR, MAX(transaction_date)::VARCHAR FROM {}",
                self.journal_table
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(range)
    }
}

/// Drain a prepared statement into a ResultSet
fn collect_resultset(
    stmt: &mut duckdb::Statement<'_>,
    params: &[&dyn duckdb::ToSql],
) -> Result<ResultSet> {
    let mut result_rows = stmt.query(params)?;

    let mut rows: Vec<Vec<serde_json::Value>> = Vec::new();
    let mut column_count = 0;

    while let Some(row) = result_rows.next()? {
        // Get column count from the first row
        if rows.is_empty() {
            column_count = row.as_ref().column_count();
        }

        let mut row_values: Vec<serde_json::Value> = Vec::with_capacity(column_count);
        for i in 0..column_count {
            row_values.push(column_value(row, i));
        }
        rows.push(row_values);
    }

    // Drop result_rows to release the borrow on stmt
    drop(result_rows);

    let column_count = if column_count > 0 {
        column_count
    } else {
        // No rows - take the column count from the statement itself
        stmt.column_count()
    };
    let columns: Vec<String> = (0..column_count)
        .map(|i| {
            stmt.column_name(i)
                .map(|s| s.to_string())
                .unwrap_or_else(|_| format!("col{}", i))
        })
        .collect();

    Ok(ResultSet::new(columns, rows))
}

fn column_value(row: &duckdb::Row, idx: usize) -> serde_json::Value {
    use duckdb::types::ValueRef;

    match row.get_ref(idx) {
        Ok(ValueRef::Null) => serde_json::Value::Null,
        Ok(ValueRef::Boolean(b)) => serde_json::Value::Bool(b),
        Ok(ValueRef::TinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::SmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Int(i)) => serde_json::json!(i),
        Ok(ValueRef::BigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::HugeInt(i)) => serde_json::json!(i.to_string()),
        Ok(ValueRef::UTinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::USmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UBigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Float(f)) => serde_json::json!(f),
        Ok(ValueRef::Double(f)) => serde_json::json!(f),
        Ok(ValueRef::Decimal(d)) => {
            // Convert Decimal to f64 for JSON compatibility; columns that
            // must stay exact are cast to VARCHAR in the SQL instead
            use std::str::FromStr;
            let s = d.to_string();
            match f64::from_str(&s) {
                Ok(f) => serde_json::json!(f),
                Err(_) => serde_json::Value::String(s),
            }
        }
        Ok(ValueRef::Text(bytes)) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        Ok(ValueRef::Date32(d)) => {
            // Days since epoch
            let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let date = epoch + chrono::Duration::days(d as i64);
            serde_json::Value::String(date.to_string())
        }
        Ok(ValueRef::Timestamp(_, ts)) => {
            // Microseconds since epoch
            let dt = chrono::DateTime::from_timestamp_micros(ts)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| ts.to_string());
            serde_json::Value::String(dt)
        }
        _ => serde_json::Value::Null,
    }
}
