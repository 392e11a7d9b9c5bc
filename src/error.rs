//! Error types for building and rendering ABA files.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for ABA operations
pub type Result<T> = std::result::Result<T, AbaError>;

/// Errors that can occur while loading or rendering a batch.
#[derive(Error, Debug)]
pub enum AbaError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Input row that cannot be turned into a batch header or transaction
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Header file contained no data row
    #[error("Header file has no batch row")]
    MissingHeader,

    /// Batch or one of its transactions failed validation
    #[error("Batch failed validation with {} error(s)", .0.len())]
    Invalid(ValidationErrors),

    /// Missing input file argument
    #[error("Missing input file arguments. Usage: aba-encode <header.csv> <transactions.csv>")]
    MissingArgument,
}
