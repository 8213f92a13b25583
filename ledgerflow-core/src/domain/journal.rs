//! Journal entry domain model

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single journal line as read from the source CSV
///
/// The sign of `amount` carries the accounting meaning: positive is a debit,
/// negative is a credit. `account_number` may point at an account that does
/// not exist in the reference data; the transform keeps such rows and marks
/// them invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub transaction_id: String,
    pub transaction_date: NaiveDate,
    pub account_number: i64,
    pub amount: Decimal,
}

impl JournalEntry {
    pub fn new(
        transaction_id: impl Into<String>,
        transaction_date: NaiveDate,
        account_number: i64,
        amount: Decimal,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            transaction_date,
            account_number,
            amount,
        }
    }

    /// True when the signed amount represents a debit
    pub fn is_debit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// True when the signed amount represents a credit
    pub fn is_credit(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Calendar year of the transaction date
    pub fn year(&self) -> i32 {
        self.transaction_date.year()
    }
}
