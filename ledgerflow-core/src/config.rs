//! Configuration management
//!
//! Settings live in `settings.json` inside the workspace directory:
//! ```json
//! {
//!   "dbPath": "ledgerflow.duckdb",
//!   "accountsCsv": "data/accounts.csv",
//!   "journalCsv": "data/journal_entries.csv",
//!   "reportPath": "output/migration_report.txt",
//!   "validYear": 2024,
//!   "invalidThreshold": 0.05,
//!   "imbalanceLimit": 10
//! }
//! ```
//! Relative paths resolve against the workspace directory. Every value has a
//! default; the loaded configuration is validated before any step runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_DB_PATH: &str = "ledgerflow.duckdb";
const DEFAULT_ACCOUNTS_CSV: &str = "data/accounts.csv";
const DEFAULT_JOURNAL_CSV: &str = "data/journal_entries.csv";
const DEFAULT_REPORT_PATH: &str = "output/migration_report.txt";
const DEFAULT_ACCOUNTS_TABLE: &str = "accounts";
const DEFAULT_JOURNAL_TABLE: &str = "journal_entries";
const DEFAULT_TRANSFORMED_TABLE: &str = "transformed_journal_entries";
const DEFAULT_VALID_YEAR: i32 = 2024;
const DEFAULT_INVALID_THRESHOLD: f64 = 0.05;
const DEFAULT_IMBALANCE_LIMIT: u32 = 10;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accounts_csv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    journal_csv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    report_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accounts_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    journal_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transformed_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invalid_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    imbalance_limit: Option<u32>,
    // Keep fields we don't manage so save() never drops them
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Pipeline configuration
///
/// Passed explicitly into every service - there are no process-wide
/// constants, so tests can point each run at its own temp workspace.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub workspace_dir: PathBuf,
    pub db_path: PathBuf,
    pub accounts_csv: PathBuf,
    pub journal_csv: PathBuf,
    pub report_path: PathBuf,
    pub accounts_table: String,
    pub journal_table: String,
    pub transformed_table: String,
    /// Transactions are valid only in this calendar year
    pub valid_year: i32,
    /// Quality gate threshold, a fraction in [0, 1]
    pub invalid_threshold: f64,
    /// Maximum number of imbalanced transactions reported
    pub imbalance_limit: u32,
}

impl PipelineConfig {
    /// Built-in defaults rooted at the given workspace directory
    pub fn defaults(workspace_dir: &Path) -> Self {
        Self {
            workspace_dir: workspace_dir.to_path_buf(),
            db_path: workspace_dir.join(DEFAULT_DB_PATH),
            accounts_csv: workspace_dir.join(DEFAULT_ACCOUNTS_CSV),
            journal_csv: workspace_dir.join(DEFAULT_JOURNAL_CSV),
            report_path: workspace_dir.join(DEFAULT_REPORT_PATH),
            accounts_table: DEFAULT_ACCOUNTS_TABLE.to_string(),
            journal_table: DEFAULT_JOURNAL_TABLE.to_string(),
            transformed_table: DEFAULT_TRANSFORMED_TABLE.to_string(),
            valid_year: DEFAULT_VALID_YEAR,
            invalid_threshold: DEFAULT_INVALID_THRESHOLD,
            imbalance_limit: DEFAULT_IMBALANCE_LIMIT,
        }
    }

    /// Load configuration from the workspace directory
    ///
    /// A missing settings.json means defaults. A settings.json that fails to
    /// parse is a configuration error - a typo in the threshold must never
    /// silently fall back to defaults and wave a bad batch through.
    pub fn load(workspace_dir: &Path) -> Result<Self> {
        let settings_path = workspace_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::config(format!("invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        let defaults = Self::defaults(workspace_dir);

        Ok(Self {
            workspace_dir: workspace_dir.to_path_buf(),
            db_path: resolve_path(workspace_dir, raw.db_path.as_deref(), defaults.db_path),
            accounts_csv: resolve_path(
                workspace_dir,
                raw.accounts_csv.as_deref(),
                defaults.accounts_csv,
            ),
            journal_csv: resolve_path(
                workspace_dir,
                raw.journal_csv.as_deref(),
                defaults.journal_csv,
            ),
            report_path: resolve_path(
                workspace_dir,
                raw.report_path.as_deref(),
                defaults.report_path,
            ),
            accounts_table: raw.accounts_table.unwrap_or(defaults.accounts_table),
            journal_table: raw.journal_table.unwrap_or(defaults.journal_table),
            transformed_table: raw.transformed_table.unwrap_or(defaults.transformed_table),
            valid_year: raw.valid_year.unwrap_or(defaults.valid_year),
            invalid_threshold: raw.invalid_threshold.unwrap_or(defaults.invalid_threshold),
            imbalance_limit: raw.imbalance_limit.unwrap_or(defaults.imbalance_limit),
        })
    }

    /// Save configuration to the workspace directory
    ///
    /// Preserves settings.json fields this tool doesn't manage.
    pub fn save(&self) -> Result<()> {
        let settings_path = self.workspace_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.db_path = Some(self.db_path.display().to_string());
        settings.accounts_csv = Some(self.accounts_csv.display().to_string());
        settings.journal_csv = Some(self.journal_csv.display().to_string());
        settings.report_path = Some(self.report_path.display().to_string());
        settings.accounts_table = Some(self.accounts_table.clone());
        settings.journal_table = Some(self.journal_table.clone());
        settings.transformed_table = Some(self.transformed_table.clone());
        settings.valid_year = Some(self.valid_year);
        settings.invalid_threshold = Some(self.invalid_threshold);
        settings.imbalance_limit = Some(self.imbalance_limit);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Validate the configuration before any step runs
    pub fn validate(&self) -> Result<()> {
        if !(1000..=9999).contains(&self.valid_year) {
            return Err(Error::config(format!(
                "valid year must be a four-digit year, got {}",
                self.valid_year
            )));
        }

        if !self.invalid_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.invalid_threshold)
        {
            return Err(Error::config(format!(
                "invalid-fraction threshold must be a fraction in [0, 1], got {}",
                self.invalid_threshold
            )));
        }

        if self.imbalance_limit == 0 {
            return Err(Error::config("imbalance limit must be at least 1"));
        }

        for name in [
            &self.accounts_table,
            &self.journal_table,
            &self.transformed_table,
        ] {
            if !is_sql_identifier(name) {
                return Err(Error::config(format!(
                    "table name '{}' is not a plain SQL identifier",
                    name
                )));
            }
        }

        if self.accounts_table == self.journal_table
            || self.accounts_table == self.transformed_table
            || self.journal_table == self.transformed_table
        {
            return Err(Error::config("table names must be pairwise distinct"));
        }

        Ok(())
    }
}

fn resolve_path(workspace_dir: &Path, value: Option<&str>, default: PathBuf) -> PathBuf {
    match value {
        Some(v) => {
            let p = PathBuf::from(v);
            if p.is_absolute() {
                p
            } else {
                workspace_dir.join(p)
            }
        }
        None => default,
    }
}

/// Table names are spliced into SQL text, so only plain identifiers pass
fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::defaults(dir.path());
        config.validate().unwrap();
        assert_eq!(config.valid_year, 2024);
        assert_eq!(config.invalid_threshold, 0.05);
        assert_eq!(config.imbalance_limit, 10);
        assert_eq!(config.transformed_table, "transformed_journal_entries");
    }

    #[test]
    fn test_load_without_settings_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::load(dir.path()).unwrap();
        assert_eq!(config.db_path, dir.path().join("ledgerflow.duckdb"));
        assert_eq!(config.accounts_csv, dir.path().join("data/accounts.csv"));
    }

    #[test]
    fn test_load_applies_overrides_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{
                "dbPath": "store/finance.duckdb",
                "validYear": 2023,
                "invalidThreshold": 0.1,
                "imbalanceLimit": 3
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(dir.path()).unwrap();
        assert_eq!(config.db_path, dir.path().join("store/finance.duckdb"));
        assert_eq!(config.valid_year, 2023);
        assert_eq!(config.invalid_threshold, 0.1);
        assert_eq!(config.imbalance_limit, 3);
        // Untouched fields keep their defaults
        assert_eq!(config.journal_table, "journal_entries");
    }

    #[test]
    fn test_load_rejects_malformed_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

        let err = PipelineConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {:?}", err);
    }

    #[test]
    fn test_validate_rejects_bad_year() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::defaults(dir.path());
        config.valid_year = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_outside_unit_interval() {
        let dir = tempdir().unwrap();

        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            let mut config = PipelineConfig::defaults(dir.path());
            config.invalid_threshold = bad;
            assert!(config.validate().is_err(), "threshold {} should fail", bad);
        }

        // Boundaries are allowed
        for ok in [0.0, 1.0, 0.05] {
            let mut config = PipelineConfig::defaults(dir.path());
            config.invalid_threshold = ok;
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::defaults(dir.path());
        config.imbalance_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_hostile_table_names() {
        let dir = tempdir().unwrap();

        for bad in ["journal entries", "journal;drop", "1journal", ""] {
            let mut config = PipelineConfig::defaults(dir.path());
            config.journal_table = bad.to_string();
            assert!(config.validate().is_err(), "name '{}' should fail", bad);
        }
    }

    #[test]
    fn test_validate_rejects_colliding_table_names() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::defaults(dir.path());
        config.transformed_table = config.journal_table.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"validYear": 2022, "someFutureKnob": true}"#,
        )
        .unwrap();

        let config = PipelineConfig::load(dir.path()).unwrap();
        config.save().unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["someFutureKnob"], serde_json::json!(true));
        assert_eq!(value["validYear"], serde_json::json!(2022));
    }
}
