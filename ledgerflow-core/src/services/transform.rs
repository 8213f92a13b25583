//! Transform service - debit/credit derivation and the quality gate

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::duckdb::DuckDbStore;
use crate::config::PipelineConfig;
use crate::domain::result::{Error, Result};

/// Transform service
///
/// Rebuilds the transformed table from the raw journal, then checks the
/// invalid fraction against the configured threshold. The gate trips only
/// strictly above the threshold; a batch at exactly the threshold passes.
/// The rebuild happens before the check, so a failed gate still leaves the
/// flagged rows in the store for inspection.
pub struct TransformService {
    store: Arc<DuckDbStore>,
    valid_year: i32,
    invalid_threshold: f64,
}

impl TransformService {
    pub fn new(store: Arc<DuckDbStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            valid_year: config.valid_year,
            invalid_threshold: config.invalid_threshold,
        }
    }

    /// Rebuild the transformed table and enforce the quality gate
    pub fn transform(&self) -> Result<TransformResult> {
        self.store.rebuild_transformed_entries(self.valid_year)?;

        let (total_rows, invalid_rows) = self.store.validity_counts()?;
        let fraction = invalid_fraction(total_rows, invalid_rows);

        if fraction > self.invalid_threshold {
            return Err(Error::quality_gate(format!(
                "{:.2}% of transformed rows are invalid, above the {:.2}% threshold ({} of {} rows)",
                fraction * 100.0,
                self.invalid_threshold * 100.0,
                invalid_rows,
                total_rows
            )));
        }

        Ok(TransformResult {
            total_rows,
            invalid_rows,
            invalid_fraction: fraction,
            threshold: self.invalid_threshold,
        })
    }
}

/// Outcome of a transform run that passed the gate
#[derive(Debug, Serialize)]
pub struct TransformResult {
    /// Rows in the transformed table
    pub total_rows: i64,
    /// Rows flagged invalid
    pub invalid_rows: i64,
    /// invalid_rows / total_rows, 0.0 for an empty batch
    pub invalid_fraction: f64,
    /// Configured threshold the fraction was checked against
    pub threshold: f64,
}

/// An empty batch has nothing invalid in it, so its fraction is 0
fn invalid_fraction(total_rows: i64, invalid_rows: i64) -> f64 {
    if total_rows == 0 {
        0.0
    } else {
        invalid_rows as f64 / total_rows as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fraction() {
        assert_eq!(invalid_fraction(0, 0), 0.0);
        assert_eq!(invalid_fraction(100, 0), 0.0);
        assert_eq!(invalid_fraction(100, 5), 0.05);
        assert_eq!(invalid_fraction(100, 100), 1.0);
    }
}
