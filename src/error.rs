//! Error types for loading, cleaning and querying the movie table.
//!
//! Every variant belongs to one of three categories, see [`ErrorCategory`]:
//! the input could not be read, a value or column did not have the expected
//! shape, or a query had nothing to aggregate.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input file missing, unreadable or not tabular.
    Io,
    /// Required column missing or a value failed type conversion.
    DataFormat,
    /// Aggregate query over a column with no non-null values.
    EmptyResult,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Failed to open or read a file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not a well-formed CSV table.
    #[error("Malformed CSV input: {0}")]
    Malformed(#[from] csv::Error),

    /// Input has no header row.
    #[error("CSV input has no header row")]
    NoHeader,

    /// Config file could not be parsed.
    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A column the operation needs is not in the table.
    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    /// A cell could not be converted to the type the column requires.
    #[error("Invalid value '{value}' in column '{column}' at row {row}: expected {expected}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    /// A row does not have one value per column.
    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Aggregate query over zero non-null values.
    #[error("No non-null values in column '{column}'")]
    EmptyResult { column: String },
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::Io { .. }
            | AnalysisError::Malformed(_)
            | AnalysisError::NoHeader
            | AnalysisError::Config { .. } => ErrorCategory::Io,
            AnalysisError::MissingColumn { .. }
            | AnalysisError::InvalidValue { .. }
            | AnalysisError::RowWidth { .. } => ErrorCategory::DataFormat,
            AnalysisError::EmptyResult { .. } => ErrorCategory::EmptyResult,
        }
    }

    pub(crate) fn missing_column(column: &str) -> Self {
        AnalysisError::MissingColumn {
            column: column.to_string(),
        }
    }

    pub(crate) fn empty_result(column: &str) -> Self {
        AnalysisError::EmptyResult {
            column: column.to_string(),
        }
    }
}

/// Result type for every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
