//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Each variant is one of the pipeline's failure kinds, so callers (and the
/// orchestrator driving the CLI) can tell a business-rule stop such as
/// `QualityGate` apart from infrastructure failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Quality gate failed: {0}")]
    QualityGate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an ingestion error
    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::Ingestion(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a quality gate error
    pub fn quality_gate(msg: impl Into<String>) -> Self {
        Self::QualityGate(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the deliberate business-rule stop, false for everything else
    pub fn is_quality_gate(&self) -> bool {
        matches!(self, Self::QualityGate(_))
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Ingestion(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
