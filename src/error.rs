//! Error types for rowdiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RowdiffError>;

#[derive(Error, Debug)]
pub enum RowdiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Fields not found: {}", describe_missing(.missing_in_a, .missing_in_b))]
    FieldNotFound {
        missing_in_a: Vec<String>,
        missing_in_b: Vec<String>,
    },

    #[error("No comparable fields found")]
    NoComparableFields,

    #[error("Table not found: {name}")]
    TableNotFound { name: String },

    #[error("Comparison failed: {source}")]
    ComparisonFailed {
        #[source]
        source: Box<RowdiffError>,
    },

    #[error("Failed to write report '{}': {message}", .path.display())]
    ReportWriteFailed { path: PathBuf, message: String },

    #[error("Adapter error: {message}")]
    Adapter { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl RowdiffError {
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn report_write(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ReportWriteFailed {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a failure raised while a comparison is executing.
    ///
    /// `TableNotFound` passes through unchanged, as does an error that is
    /// already wrapped.
    pub fn comparison_failed(err: RowdiffError) -> Self {
        match err {
            Self::TableNotFound { .. } | Self::ComparisonFailed { .. } => err,
            other => Self::ComparisonFailed {
                source: Box::new(other),
            },
        }
    }
}

fn describe_missing(missing_in_a: &[String], missing_in_b: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing_in_a.is_empty() {
        parts.push(format!("[{}] missing in table1", missing_in_a.join(", ")));
    }
    if !missing_in_b.is_empty() {
        parts.push(format!("[{}] missing in table2", missing_in_b.join(", ")));
    }
    parts.join("; ")
}
