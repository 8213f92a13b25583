//! Summary service - per-account balances

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbStore;
use crate::domain::result::Result;
use crate::domain::ResultSet;

/// Summary service
///
/// Aggregates the transformed table into one net balance per account,
/// counting only rows that passed validation. Invalid rows influence the
/// quality gate, not the balances.
pub struct SummaryService {
    store: Arc<DuckDbStore>,
}

impl SummaryService {
    pub fn new(store: Arc<DuckDbStore>) -> Self {
        Self { store }
    }

    /// Net balance per account, highest first
    pub fn account_balances(&self) -> Result<ResultSet> {
        self.store.account_balances()
    }
}
