//! The `DistanceWriter` trait implemented by all backend writers.

use crate::{DistanceRow, ReduceResult};

/// Trait implemented by CSV, SQLite, and Parquet writers.
pub trait DistanceWriter {
    /// Append a batch of rows.
    fn write_rows(&mut self, rows: &[DistanceRow]) -> ReduceResult<()>;

    /// Flush and close the underlying file.
    ///
    /// Idempotent.
    fn finish(&mut self) -> ReduceResult<()>;
}
