//! `ax-reduce`: folding per-source distance records into one table, and
//! keeping that table recoverable across crashes.
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`table`]      | `ResultTable`: minimum distance per target node          |
//! | [`checkpoint`] | `CheckpointLog` (append) and `replay` (rebuild + resume) |
//! | [`export`]     | `export_table`: node distances → per-target-id rows      |
//! | [`writer`]     | `DistanceWriter` trait                                   |
//! | [`row`]        | `DistanceRow`                                            |
//! | [`error`]      | `ReduceError`, `ReduceResult<T>`                         |
//!
//! Writer backends sit behind Cargo features:
//!
//! | Feature   | Backend  | Output                                   |
//! |-----------|----------|------------------------------------------|
//! | *(none)*  | CSV      | `target_id,distance` text file           |
//! | `sqlite`  | SQLite   | `distances` table in a database file     |
//! | `parquet` | Parquet  | two-column Snappy-compressed file        |

pub mod checkpoint;
pub mod csv;
pub mod error;
pub mod export;
pub mod row;
pub mod table;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use crate::csv::CsvWriter;
pub use checkpoint::{CheckpointLog, LogReplay, replay, replay_reader};
pub use error::{ReduceError, ReduceResult};
pub use export::export_table;
pub use row::DistanceRow;
pub use table::ResultTable;
pub use writer::DistanceWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
