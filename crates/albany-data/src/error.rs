//! Error types for data operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: NaiveDate,
        /// End date of the range
        end: NaiveDate,
    },

    /// A requested column is not present in the table
    #[error("Column '{column}' not found in {table}")]
    MissingColumn {
        /// Table that was queried
        table: String,
        /// Column that was requested
        column: String,
    },

    /// A cell could not be parsed
    #[error("Parse error in {table} at line {line}, column '{column}': {reason}")]
    Parse {
        /// Table being read
        table: String,
        /// One-based line number in the source
        line: u64,
        /// Column holding the bad value
        column: String,
        /// What went wrong
        reason: String,
    },

    /// Table dimensions don't agree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },
}
