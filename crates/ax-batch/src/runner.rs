//! Category batch runner: route every source of one category, checkpointing
//! after each, and resume from the log after an interruption.
//!
//! # Resume contract
//!
//! 1. Replay `<log_dir>/<category>.log.csv` into a [`ResultTable`].
//! 2. Reject the log if it names a source the current list does not have
//!    ([`BatchError::ResumeMismatch`]).
//! 3. Truncate the log to its last commit row and continue at position
//!    `max_index - 1`, re-routing the last logged source.
//! 4. Once the caller has exported the table it calls
//!    [`CategoryOutcome::finish`], which deletes the log.  Until then a
//!    rerun resumes at the last source instead of starting over.
//!
//! Because the table is a minimum, re-routing a source never changes it.

use std::path::{Path, PathBuf};

use log::info;

use ax_core::BatchIndex;
use ax_reduce::{CheckpointLog, LogReplay, ResultTable, replay};
use ax_route::{AdaptiveRouter, DijkstraBackend, ShortestPathBackend, SourcePlan};

use crate::{BatchError, BatchObserver, BatchResult};

// ── Report ────────────────────────────────────────────────────────────────────

/// Counters for one category run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Sources in the category.
    pub sources:     usize,
    /// Sources not routed because the checkpoint log already covered them.
    pub skipped:     usize,
    /// Sources routed by this run.
    pub routed:      usize,
    /// Distance records written by this run.
    pub records:     usize,
    /// Routed sources whose coverage is best-effort.
    pub best_effort: usize,
    /// A torn final checkpoint row was dropped on resume.
    pub torn_tail:   bool,
}

impl BatchReport {
    pub(crate) fn absorb(&mut self, other: &BatchReport) {
        self.sources     += other.sources;
        self.skipped     += other.skipped;
        self.routed      += other.routed;
        self.records     += other.records;
        self.best_effort += other.best_effort;
        self.torn_tail   |= other.torn_tail;
    }
}

/// Final state of a category.  Its checkpoint logs stay on disk until
/// [`finish`](Self::finish).
#[derive(Debug)]
pub struct CategoryOutcome {
    pub table:  ResultTable,
    pub report: BatchReport,
    logs:       Vec<CheckpointLog>,
}

impl CategoryOutcome {
    pub(crate) fn new(table: ResultTable, report: BatchReport, logs: Vec<CheckpointLog>) -> Self {
        Self { table, report, logs }
    }

    /// Paths of the checkpoint logs this outcome still holds.
    pub fn log_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.logs.iter().map(CheckpointLog::path)
    }

    /// Delete the checkpoint logs.  Call after the table has been written
    /// out; dropping the outcome instead keeps the logs for a rerun.
    pub fn finish(self) -> BatchResult<()> {
        for log in self.logs {
            log.remove()?;
        }
        Ok(())
    }
}

/// A contiguous run of sources sharing one checkpoint log.
pub(crate) struct Segment<'p> {
    pub log_path: PathBuf,
    /// Global position of `plans[0]`.
    pub base:     usize,
    pub plans:    &'p [SourcePlan],
    /// Total sources in the category, for mismatch reporting.
    pub total:    usize,
}

pub(crate) struct SegmentOutcome {
    pub table:  ResultTable,
    pub report: BatchReport,
    pub log:    CheckpointLog,
}

// ── BatchRunner ───────────────────────────────────────────────────────────────

/// Drives an [`AdaptiveRouter`] over the sources of one category.
pub struct BatchRunner<'r, 'a, B: ShortestPathBackend = DijkstraBackend> {
    router:  &'r AdaptiveRouter<'a, B>,
    log_dir: PathBuf,
}

impl<'r, 'a, B: ShortestPathBackend> BatchRunner<'r, 'a, B> {
    pub fn new(router: &'r AdaptiveRouter<'a, B>, log_dir: impl Into<PathBuf>) -> Self {
        Self { router, log_dir: log_dir.into() }
    }

    pub fn router(&self) -> &AdaptiveRouter<'a, B> {
        self.router
    }

    /// Checkpoint log location for `category`.
    pub fn log_path(&self, category: &str) -> PathBuf {
        self.log_dir.join(format!("{category}.log.csv"))
    }

    /// Route every source in `plans`, resuming from an existing log.  The
    /// log is handed back in the outcome.
    pub fn run<O: BatchObserver>(
        &self,
        category: &str,
        plans:    &[SourcePlan],
        observer: &mut O,
    ) -> BatchResult<CategoryOutcome> {
        observer.on_batch_start(category, plans.len());
        let segment = self.segment(category, plans);
        let SegmentOutcome { table, report, log } = self.run_segment(&segment, plans.len(), observer)?;

        info!(
            "{category}: {} sources done ({} routed, {} skipped, {} best-effort), {} targets reached",
            report.sources, report.routed, report.skipped, report.best_effort, table.len()
        );
        observer.on_batch_end(category, &report);
        Ok(CategoryOutcome::new(table, report, vec![log]))
    }

    /// Like [`run`](Self::run) but stops before position `stop`, as an
    /// interrupted run would.  The outcome holds no log, so `finish` leaves
    /// the file in place.
    pub fn run_until<O: BatchObserver>(
        &self,
        category: &str,
        plans:    &[SourcePlan],
        stop:     usize,
        observer: &mut O,
    ) -> BatchResult<CategoryOutcome> {
        observer.on_batch_start(category, plans.len());
        let segment = self.segment(category, plans);
        let SegmentOutcome { table, report, .. } =
            self.run_segment(&segment, stop.min(plans.len()), observer)?;
        Ok(CategoryOutcome::new(table, report, Vec::new()))
    }

    fn segment<'p>(&self, category: &str, plans: &'p [SourcePlan]) -> Segment<'p> {
        Segment { log_path: self.log_path(category), base: 0, plans, total: plans.len() }
    }

    /// Replay, validate and continue one segment up to local position `stop`.
    pub(crate) fn run_segment<O: BatchObserver + ?Sized>(
        &self,
        segment:  &Segment<'_>,
        stop:     usize,
        observer: &mut O,
    ) -> BatchResult<SegmentOutcome> {
        let replayed = replay(&segment.log_path)?;
        let start = resume_start(segment, &replayed)?;
        let mut log = CheckpointLog::open(&segment.log_path, replayed.committed_len)?;

        let mut table = replayed.table;
        let mut report = BatchReport {
            sources:   segment.plans.len(),
            skipped:   start,
            torn_tail: replayed.torn_tail,
            ..BatchReport::default()
        };
        if start > 0 || replayed.commits > 0 {
            info!(
                "{}: resuming at source {} of {} ({} batches replayed)",
                segment.log_path.display(),
                segment.base + start + 1,
                segment.total,
                replayed.commits
            );
            observer.on_resume(start);
        }

        for (offset, plan) in segment.plans.iter().enumerate().take(stop).skip(start) {
            let batch_index = BatchIndex::from_position(segment.base + offset);
            let outcome = self.router.route(batch_index, plan)?;
            log.append(batch_index, &outcome.records)?;
            table.merge_records(&outcome.records);

            report.routed += 1;
            report.records += outcome.records.len();
            if outcome.is_best_effort() {
                report.best_effort += 1;
            }
            observer.on_source_done(&outcome);
        }
        Ok(SegmentOutcome { table, report, log })
    }
}

/// Local position to restart from, after checking the log belongs to
/// `segment`.
fn resume_start(segment: &Segment<'_>, replayed: &LogReplay) -> BatchResult<usize> {
    let Some(max) = replayed.max_index else {
        return Ok(0);
    };
    let end = segment.base + segment.plans.len();
    if max.index() > end {
        return Err(BatchError::ResumeMismatch { logged: max.0, sources: end });
    }
    let expected_first = BatchIndex::from_position(segment.base);
    if let Some(first) = replayed.first_index.filter(|&f| f != expected_first) {
        return Err(BatchError::ShardMismatch {
            path:           segment.log_path.clone(),
            logged_first:   first.0,
            expected_first: expected_first.0,
        });
    }
    Ok(max.position().saturating_sub(segment.base))
}
