//! Query service - ad-hoc SQL against the pipeline store

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbStore;
use crate::domain::result::Result;
use crate::domain::ResultSet;

/// Query service for read-only SQL inspection
pub struct QueryService {
    store: Arc<DuckDbStore>,
}

impl QueryService {
    pub fn new(store: Arc<DuckDbStore>) -> Self {
        Self { store }
    }

    /// Execute a SELECT statement
    pub fn execute(&self, sql: &str) -> Result<ResultSet> {
        self.store.execute_query(sql)
    }
}
