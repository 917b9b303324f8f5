//! Durable, append-only checkpoint log.
//!
//! # Format
//!
//! ```csv
//! batch_index,target_node,distance
//! 1,812,4.25
//! 1,907,6.5
//! 1,,
//! 2,,
//! 3,812,3.0
//! 3,,
//! ```
//!
//! Each routed source appends its records followed by a commit row
//! (`batch_index,,`).  The whole group is flushed and `sync_data`'d before
//! the next source starts.
//!
//! # Replay
//!
//! The [`ResultTable`] is a pure function of the committed rows: data rows
//! are folded in only once their commit row has been read, so a write torn by
//! a crash never injects a truncated distance.  Replay reports the largest
//! batch index seen on any well-formed row (`max_index`), from which the
//! caller resumes at position `max_index - 1`, re-running the last logged
//! source.
//!
//! | Damage                                   | Outcome                        |
//! |------------------------------------------|--------------------------------|
//! | malformed final row                      | dropped, `torn_tail = true`    |
//! | data rows without a commit row           | dropped                        |
//! | malformed row followed by valid rows     | [`ReduceError::CorruptLog`]    |
//! | commit row for a different batch         | [`ReduceError::CorruptLog`]    |
//! | batch index lower than a committed one   | [`ReduceError::CorruptLog`]    |
//!
//! [`CheckpointLog::open`] truncates the file to the end of the last commit
//! row before appending, so dropped rows never survive into a later replay.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use log::{debug, warn};
use serde::Deserialize;

use ax_core::{BatchIndex, DistanceRecord, NodeId};

use crate::{ReduceError, ReduceResult, ResultTable};

const HEADER: [&str; 3] = ["batch_index", "target_node", "distance"];

// ── Writing ───────────────────────────────────────────────────────────────────

/// Exclusive append handle on one category's (or shard's) log file.
pub struct CheckpointLog {
    path:   PathBuf,
    writer: Writer<File>,
}

impl CheckpointLog {
    /// Open `path` for appending, first truncating it to `committed_len`
    /// bytes (from [`LogReplay::committed_len`]).  A length of 0 starts a new
    /// log with a fresh header.
    pub fn open(path: &Path, committed_len: u64) -> ReduceResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(committed_len)?;
        file.seek(SeekFrom::End(0))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if committed_len == 0 {
            writer.write_record(HEADER)?;
            sync(&mut writer)?;
        }
        Ok(Self { path: path.to_path_buf(), writer })
    }

    /// Start a new, empty log at `path`, discarding any previous content.
    pub fn create(path: &Path) -> ReduceResult<Self> {
        Self::open(path, 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append one source's records and its commit row.
    pub fn append(&mut self, batch_index: BatchIndex, records: &[DistanceRecord]) -> ReduceResult<()> {
        let index = batch_index.0.to_string();
        for r in records {
            self.writer
                .write_record(&[index.clone(), r.target.0.to_string(), r.distance.to_string()])?;
        }
        self.writer.write_record([index.as_str(), "", ""])?;
        sync(&mut self.writer)
    }

    /// Close and delete the log file.
    pub fn remove(self) -> ReduceResult<()> {
        let Self { path, writer } = self;
        drop(writer);
        std::fs::remove_file(&path)?;
        debug!("removed checkpoint log {}", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for CheckpointLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointLog").field("path", &self.path).finish_non_exhaustive()
    }
}

fn sync(writer: &mut Writer<File>) -> ReduceResult<()> {
    writer.flush()?;
    writer.get_ref().sync_data()?;
    Ok(())
}

// ── Replay ────────────────────────────────────────────────────────────────────

/// State rebuilt from a checkpoint log.
#[derive(Clone, Debug, Default)]
pub struct LogReplay {
    /// Minimum over every committed record.
    pub table:         ResultTable,
    /// Batch index of the first well-formed row.
    pub first_index:   Option<BatchIndex>,
    /// Largest batch index on any well-formed row, committed or not.
    pub max_index:     Option<BatchIndex>,
    /// Number of commit rows read.
    pub commits:       usize,
    /// Committed data rows folded into `table`.
    pub rows:          usize,
    /// A malformed final row was dropped.
    pub torn_tail:     bool,
    /// Byte offset just past the last commit row; 0 if there is none.
    pub committed_len: u64,
}

impl LogReplay {
    /// 0-based position of the first source to route when resuming.
    pub fn resume_position(&self) -> usize {
        self.max_index.map_or(0, BatchIndex::position)
    }
}

#[derive(Deserialize)]
struct LogRow {
    batch_index: u32,
    target_node: Option<u32>,
    distance:    Option<f64>,
}

enum Entry {
    Data(BatchIndex, NodeId, f64),
    Commit(BatchIndex),
}

fn classify(row: LogRow) -> Result<Entry, String> {
    if row.batch_index == 0 {
        return Err("batch index 0".into());
    }
    let index = BatchIndex(row.batch_index);
    match (row.target_node, row.distance) {
        (None, None) => Ok(Entry::Commit(index)),
        (Some(t), Some(d)) if d.is_finite() && d >= 0.0 => Ok(Entry::Data(index, NodeId(t), d)),
        (Some(_), Some(d)) => Err(format!("invalid distance {d}")),
        _ => Err("incomplete row".into()),
    }
}

/// Rebuild state from the log at `path`.  A missing file replays as empty.
pub fn replay(path: &Path) -> ReduceResult<LogReplay> {
    match File::open(path) {
        Ok(file) => replay_reader(file),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LogReplay::default()),
        Err(e) => Err(e.into()),
    }
}

/// Like [`replay`] but accepts any `Read` source.
pub fn replay_reader<R: Read>(reader: R) -> ReduceResult<LogReplay> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = LogReplay::default();

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!("checkpoint log header unreadable ({e}); starting over");
            out.torn_tail = true;
            return Ok(out);
        }
    };
    if headers.is_empty() {
        return Ok(out);
    }

    let mut record = StringRecord::new();
    let mut pending: Vec<(NodeId, f64)> = Vec::new();
    let mut pending_index: Option<BatchIndex> = None;
    let mut last_commit: Option<BatchIndex> = None;
    // A malformed row is only fatal if something valid follows it.
    let mut bad: Option<(u64, String)> = None;

    loop {
        let line = rdr.position().line();
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => {
                if let Some((line, reason)) = bad {
                    return Err(ReduceError::CorruptLog { line, reason });
                }
                bad = Some((e.position().map_or(line, |p| p.line()), e.to_string()));
                continue;
            }
        }
        if let Some((line, reason)) = bad.take() {
            return Err(ReduceError::CorruptLog { line, reason });
        }

        let entry = match record.deserialize::<LogRow>(Some(&headers)) {
            Ok(row) => classify(row),
            Err(e) => Err(e.to_string()),
        };
        let entry = match entry {
            Ok(entry) => entry,
            Err(reason) => {
                bad = Some((line, reason));
                continue;
            }
        };

        let index = match entry {
            Entry::Data(i, _, _) | Entry::Commit(i) => i,
        };
        if last_commit.is_some_and(|c| index < c) {
            return Err(ReduceError::CorruptLog {
                line,
                reason: format!("batch {} after committed batch {}", index.0, last_commit.map_or(0, |c| c.0)),
            });
        }
        if pending_index.is_some_and(|p| p != index) {
            return Err(ReduceError::CorruptLog {
                line,
                reason: format!("batch {} interleaved with uncommitted batch {}", index.0, pending_index.map_or(0, |p| p.0)),
            });
        }
        out.first_index.get_or_insert(index);
        out.max_index = out.max_index.max(Some(index));

        match entry {
            Entry::Data(_, target, distance) => {
                pending.push((target, distance));
                pending_index = Some(index);
            }
            Entry::Commit(_) => {
                for (target, distance) in pending.drain(..) {
                    out.table.offer(target, distance);
                    out.rows += 1;
                }
                pending_index = None;
                last_commit = Some(index);
                out.commits += 1;
                out.committed_len = rdr.position().byte();
            }
        }
    }

    if let Some((line, reason)) = bad {
        warn!("dropping torn final checkpoint row at line {line}: {reason}");
        out.torn_tail = true;
    }
    if !pending.is_empty() {
        debug!("dropping {} uncommitted checkpoint rows", pending.len());
    }
    Ok(out)
}
