//! Final export: node-keyed distances to rows keyed by target point id.

use log::info;

use ax_core::AttachedPoint;

use crate::writer::DistanceWriter;
use crate::{DistanceRow, ReduceResult, ResultTable};

const CHUNK_ROWS: usize = 65_536;

/// Write one row per target point whose node has a distance in `table`, in
/// `targets` order, then finish the writer.  Targets sharing a node each get
/// their own row.  Returns the number of rows written.
pub fn export_table<W: DistanceWriter + ?Sized>(
    table:   &ResultTable,
    targets: &[AttachedPoint],
    writer:  &mut W,
) -> ReduceResult<usize> {
    let mut chunk = Vec::with_capacity(CHUNK_ROWS.min(targets.len()));
    let mut written = 0usize;
    for target in targets {
        let Some(distance) = table.get(target.node) else {
            continue;
        };
        chunk.push(DistanceRow { target_id: target.id.clone(), distance });
        if chunk.len() == CHUNK_ROWS {
            writer.write_rows(&chunk)?;
            written += chunk.len();
            chunk.clear();
        }
    }
    writer.write_rows(&chunk)?;
    written += chunk.len();
    writer.finish()?;

    info!("exported {written} of {} targets", targets.len());
    Ok(written)
}
