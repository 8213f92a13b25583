//! Account domain model

use serde::{Deserialize, Serialize};

/// A ledger account from the reference dataset
///
/// Static reference data: loaded once per run and fully replaced. The
/// account_number is the unique key journal entries point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: i64,
    pub account_name: String,
}

impl Account {
    pub fn new(account_number: i64, account_name: impl Into<String>) -> Self {
        Self {
            account_number,
            account_name: account_name.into(),
        }
    }
}
