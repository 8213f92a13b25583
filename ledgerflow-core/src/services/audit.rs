//! Audit service - double-entry imbalance detection

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbStore;
use crate::config::PipelineConfig;
use crate::domain::result::Result;
use crate::domain::ResultSet;

/// Audit service
///
/// Finds transactions whose debits and credits do not cancel out. Works on
/// the raw journal rather than the transformed table: rows that failed
/// validity checks still count toward a transaction's balance.
pub struct AuditService {
    store: Arc<DuckDbStore>,
    imbalance_limit: u32,
}

impl AuditService {
    pub fn new(store: Arc<DuckDbStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            imbalance_limit: config.imbalance_limit,
        }
    }

    /// Transaction ids with unequal debit and credit totals, capped at the
    /// configured limit
    pub fn imbalanced_transactions(&self) -> Result<ResultSet> {
        self.store.imbalanced_transactions(self.imbalance_limit)
    }
}
