//! Tabular result set - the inter-step hand-off contract
//!
//! Aggregation steps produce a `ResultSet`; the report step consumes two of
//! them. When the orchestrator isolates task memory, the JSON form produced
//! by `to_json` is the wire format between processes.

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Ordered rows with named columns
///
/// Cell values are JSON scalars. Money columns are carried as exact decimal
/// strings (the store casts them to VARCHAR) so the hand-off never loses
/// precision to floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// An empty result with just the column headers
    pub fn empty(columns: Vec<String>) -> Self {
        Self::new(columns, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode for cross-process hand-off
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a hand-off payload, rejecting structurally inconsistent input
    ///
    /// A payload whose row_count disagrees with the rows, or whose rows do
    /// not match the column list in width, is a serialization error: the
    /// report step must never render a silently truncated result.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: ResultSet = serde_json::from_str(json)?;

        if set.row_count != set.rows.len() {
            return Err(Error::serialization(format!(
                "row_count {} does not match {} rows",
                set.row_count,
                set.rows.len()
            )));
        }
        for (i, row) in set.rows.iter().enumerate() {
            if row.len() != set.columns.len() {
                return Err(Error::serialization(format!(
                    "row {} has {} values but {} columns are declared",
                    i,
                    row.len(),
                    set.columns.len()
                )));
            }
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["transaction_id".to_string()],
            vec![vec![json!("T2")], vec![json!("T7")]],
        )
    }

    #[test]
    fn test_round_trip() {
        let set = sample();
        let encoded = set.to_json().unwrap();
        let decoded = ResultSet::from_json(&encoded).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let json = r#"{"columns":["a"],"rows":[["x"]],"row_count":5}"#;
        let err = ResultSet::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let json = r#"{"columns":["a","b"],"rows":[["x"]],"row_count":1}"#;
        let err = ResultSet::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ResultSet::from_json("{nope").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_empty_keeps_columns() {
        let set = ResultSet::empty(vec!["account_name".into(), "final_balance".into()]);
        assert!(set.is_empty());
        assert_eq!(set.row_count, 0);
        assert_eq!(set.columns.len(), 2);
    }
}
