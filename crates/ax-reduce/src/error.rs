//! Error types for ax-reduce.

use thiserror::Error;

/// Errors that can occur while logging, replaying or exporting distances.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The checkpoint log is damaged somewhere other than its final row.
    #[error("corrupt checkpoint log at line {line}: {reason}")]
    CorruptLog { line: u64, reason: String },

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Alias for `Result<T, ReduceError>`.
pub type ReduceResult<T> = Result<T, ReduceError>;
