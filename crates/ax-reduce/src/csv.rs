//! CSV output backend.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::DistanceWriter;
use crate::{DistanceRow, ReduceResult};

/// Writes `target_id,distance` rows to one CSV file.
pub struct CsvWriter {
    rows:     Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create (or replace) the file at `path` and write the header row.
    pub fn new(path: &Path) -> ReduceResult<Self> {
        let mut rows = Writer::from_path(path)?;
        rows.write_record(["target_id", "distance"])?;
        Ok(Self { rows, finished: false })
    }
}

impl DistanceWriter for CsvWriter {
    fn write_rows(&mut self, rows: &[DistanceRow]) -> ReduceResult<()> {
        for row in rows {
            self.rows.write_record(&[row.target_id.clone(), row.distance.to_string()])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> ReduceResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}
