//! Status service - pipeline store summaries

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::duckdb::DuckDbStore;
use crate::config::PipelineConfig;
use crate::domain::result::Result;

/// Status service for inspecting what the pipeline has materialized
pub struct StatusService {
    store: Arc<DuckDbStore>,
    accounts_table: String,
    journal_table: String,
    transformed_table: String,
}

impl StatusService {
    pub fn new(store: Arc<DuckDbStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            accounts_table: config.accounts_table.clone(),
            journal_table: config.journal_table.clone(),
            transformed_table: config.transformed_table.clone(),
        }
    }

    /// Get overall store status
    ///
    /// Table counts are None for tables the pipeline has not created yet.
    pub fn get_status(&self) -> Result<StatusReport> {
        if !self.store.db_path().exists() {
            return Ok(StatusReport::default());
        }

        let accounts = self.count_if_exists(&self.accounts_table)?;
        let journal_entries = self.count_if_exists(&self.journal_table)?;
        let transformed_entries = self.count_if_exists(&self.transformed_table)?;

        let (valid_entries, invalid_entries) = match transformed_entries {
            Some(_) => {
                let (total, invalid) = self.store.validity_counts()?;
                (Some(total - invalid), Some(invalid))
            }
            None => (None, None),
        };

        let journal_date_range = match journal_entries {
            Some(n) if n > 0 => {
                let (earliest, latest) = self.store.journal_date_range()?;
                DateRange { earliest, latest }
            }
            _ => DateRange::default(),
        };

        Ok(StatusReport {
            database_exists: true,
            accounts,
            journal_entries,
            transformed_entries,
            valid_entries,
            invalid_entries,
            journal_date_range,
        })
    }

    fn count_if_exists(&self, table: &str) -> Result<Option<i64>> {
        if self.store.table_exists(table)? {
            Ok(Some(self.store.row_count(table)?))
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct StatusReport {
    pub database_exists: bool,
    pub accounts: Option<i64>,
    pub journal_entries: Option<i64>,
    pub transformed_entries: Option<i64>,
    pub valid_entries: Option<i64>,
    pub invalid_entries: Option<i64>,
    pub journal_date_range: DateRange,
}

#[derive(Debug, Default, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}
