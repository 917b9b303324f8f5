//! SQLite output backend (feature `sqlite`).
//!
//! One database file per category with a single `distances` table.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::DistanceWriter;
use crate::{DistanceRow, ReduceResult};

/// Writes distances to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) the database at `path` and reset the `distances`
    /// table.
    pub fn new(path: &Path) -> ReduceResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             DROP TABLE IF EXISTS distances;
             CREATE TABLE distances (
                 target_id TEXT NOT NULL,
                 distance  REAL NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl DistanceWriter for SqliteWriter {
    fn write_rows(&mut self, rows: &[DistanceRow]) -> ReduceResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO distances (target_id, distance) VALUES (?1, ?2)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.target_id, row.distance])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> ReduceResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
