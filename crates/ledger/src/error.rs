//! Ledger Error Types

use thiserror::Error;

/// A ledger date that could not be normalized to a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed date {value:?} at row {row}")]
pub struct MalformedDateError {
    /// Zero-based index of the offending record in the input sequence
    pub row: usize,
    /// The raw text that failed to parse
    pub value: String,
}

/// Errors while reading or writing a ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Date could not be normalized
    #[error(transparent)]
    MalformedDate(#[from] MalformedDateError),

    /// Required column not present in the header
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Non-empty numeric cell that is not a number
    #[error("Invalid number {value:?} in column {column} at line {line}")]
    InvalidNumber {
        column: &'static str,
        value: String,
        line: usize,
    },

    /// Underlying CSV failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
