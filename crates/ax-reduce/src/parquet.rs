//! Parquet output backend (feature `parquet`).

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::DistanceWriter;
use crate::{DistanceRow, ReduceResult};

fn distance_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("target_id", DataType::Utf8,    false),
        Field::new("distance",  DataType::Float64, false),
    ]))
}

/// Writes distances to one Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(path: &Path) -> ReduceResult<Self> {
        let schema = distance_schema();
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let writer = ArrowWriter::try_new(File::create(path)?, Arc::clone(&schema), Some(props))?;
        Ok(Self { writer: Some(writer), schema })
    }
}

impl DistanceWriter for ParquetWriter {
    fn write_rows(&mut self, rows: &[DistanceRow]) -> ReduceResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mut ids       = StringBuilder::new();
        let mut distances = Float64Builder::new();
        for row in rows {
            ids.append_value(&row.target_id);
            distances.append_value(row.distance);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![Arc::new(ids.finish()), Arc::new(distances.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> ReduceResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}
