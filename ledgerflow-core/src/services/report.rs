//! Report service - plain-text migration report

use std::io::Write;
use std::path::{Path, PathBuf};

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use tempfile::NamedTempFile;

use crate::config::PipelineConfig;
use crate::domain::result::{Error, Result};
use crate::domain::ResultSet;

/// Report service
///
/// Renders the two aggregation results into a text report and writes it to
/// the configured path. The write goes through a temp file in the same
/// directory and a rename, so a crash mid-write never leaves a truncated
/// report behind.
pub struct ReportService {
    report_path: PathBuf,
}

impl ReportService {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            report_path: config.report_path.clone(),
        }
    }

    /// Render and write the report, returning the path written
    pub fn write_report(
        &self,
        imbalanced: &ResultSet,
        balances: &ResultSet,
    ) -> Result<PathBuf> {
        let content = render_report(imbalanced, balances);

        let parent = self
            .report_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.report_path).map_err(|e| Error::Io(e.error))?;

        Ok(self.report_path.clone())
    }
}

/// Render the report text
///
/// Output depends only on the two result sets, so identical inputs produce
/// byte-identical reports.
pub fn render_report(imbalanced: &ResultSet, balances: &ResultSet) -> String {
    let mut out = String::new();

    out.push_str("=== Financial Data Migration Report ===\n");
    out.push('\n');
    out.push_str("--- Imbalanced Transactions ---\n");
    out.push_str(&render_section(imbalanced));
    out.push('\n');
    out.push_str("--- Account Summary (Valid Transactions) ---\n");
    out.push_str(&render_section(balances));

    out
}

fn render_section(result: &ResultSet) -> String {
    if result.rows.is_empty() {
        return "(none)\n".to_string();
    }

    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(&result.columns);
    for row in &result.rows {
        let values: Vec<String> = row.iter().map(value_to_string).collect();
        table.add_row(values);
    }

    format!("{}\n", table)
}

fn value_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn imbalanced_fixture() -> ResultSet {
        ResultSet::new(
            vec!["transaction_id".to_string()],
            vec![vec![json!("TXN-2")], vec![json!("TXN-7")]],
        )
    }

    fn balances_fixture() -> ResultSet {
        ResultSet::new(
            vec!["account_name".to_string(), "final_balance".to_string()],
            vec![
                vec![json!("Cash"), json!("150.00")],
                vec![json!("Revenue"), json!("-150.00")],
            ],
        )
    }

    #[test]
    fn test_render_contains_sections_and_values() {
        let text = render_report(&imbalanced_fixture(), &balances_fixture());
        assert!(text.starts_with("=== Financial Data Migration Report ==="));
        assert!(text.contains("--- Imbalanced Transactions ---"));
        assert!(text.contains("--- Account Summary (Valid Transactions) ---"));
        assert!(text.contains("TXN-2"));
        assert!(text.contains("TXN-7"));
        assert!(text.contains("Cash"));
        assert!(text.contains("150.00"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render_report(&imbalanced_fixture(), &balances_fixture());
        let b = render_report(&imbalanced_fixture(), &balances_fixture());
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_empty_sections() {
        let empty_ids = ResultSet::new(vec!["transaction_id".to_string()], vec![]);
        let empty_balances = ResultSet::new(
            vec!["account_name".to_string(), "final_balance".to_string()],
            vec![],
        );
        let text = render_report(&empty_ids, &empty_balances);
        assert_eq!(text.matches("(none)").count(), 2);
    }

    #[test]
    fn test_null_renders_as_null() {
        let rs = ResultSet::new(
            vec!["account_name".to_string()],
            vec![vec![serde_json::Value::Null]],
        );
        let text = render_section(&rs);
        assert!(text.contains("NULL"));
    }

    #[test]
    fn test_write_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("nested").join("report.txt");

        let config = crate::config::PipelineConfig {
            report_path: report_path.clone(),
            ..crate::config::PipelineConfig::defaults(dir.path())
        };
        let service = ReportService::new(&config);

        let written = service
            .write_report(&imbalanced_fixture(), &balances_fixture())
            .unwrap();
        assert_eq!(written, report_path);
        let first = std::fs::read_to_string(&report_path).unwrap();
        assert!(first.contains("TXN-2"));

        // Second write replaces the file
        let empty = ResultSet::new(vec!["transaction_id".to_string()], vec![]);
        service.write_report(&empty, &balances_fixture()).unwrap();
        let second = std::fs::read_to_string(&report_path).unwrap();
        assert!(second.contains("(none)"));
        assert!(!second.contains("TXN-2"));
    }
}
