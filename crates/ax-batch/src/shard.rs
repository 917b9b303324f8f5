//! Sharded execution (feature `parallel`).
//!
//! The source list is cut into `shards` contiguous ranges.  Each range is
//! routed on Rayon's pool with its own checkpoint log
//! (`<category>.shard<i>.log.csv`) and the shard tables are merged by
//! per-target minimum, which gives the same table as a sequential run.
//!
//! A sharded category must be resumed with the same shard count; a log whose
//! first batch does not match its shard fails with
//! [`BatchError::ShardMismatch`](crate::BatchError::ShardMismatch).

use std::sync::Mutex;

use log::info;
use rayon::prelude::*;

use ax_reduce::ResultTable;
use ax_route::{ShortestPathBackend, SourceOutcome, SourcePlan};

use crate::runner::{Segment, SegmentOutcome};
use crate::{BatchObserver, BatchReport, BatchResult, BatchRunner, CategoryOutcome};

/// Forwards shard callbacks to one observer shared behind a mutex.
struct SharedObserver<'s, 'o, O: BatchObserver + Send> {
    inner: &'s Mutex<&'o mut O>,
}

impl<O: BatchObserver + Send> BatchObserver for SharedObserver<'_, '_, O> {
    fn on_resume(&mut self, skipped: usize) {
        if let Ok(mut o) = self.inner.lock() {
            o.on_resume(skipped);
        }
    }

    fn on_source_done(&mut self, outcome: &SourceOutcome) {
        if let Ok(mut o) = self.inner.lock() {
            o.on_source_done(outcome);
        }
    }
}

impl<B: ShortestPathBackend> BatchRunner<'_, '_, B> {
    /// Checkpoint log location for shard `shard` of `category`.
    pub fn shard_log_path(&self, category: &str, shard: usize) -> std::path::PathBuf {
        self.log_path(category).with_file_name(format!("{category}.shard{shard}.log.csv"))
    }

    /// Route `plans` in `shards` parallel contiguous shards.  `shards <= 1`
    /// falls back to [`run`](Self::run).
    pub fn run_sharded<O: BatchObserver + Send>(
        &self,
        category: &str,
        plans:    &[SourcePlan],
        shards:   usize,
        observer: &mut O,
    ) -> BatchResult<CategoryOutcome> {
        if shards <= 1 || plans.len() < 2 {
            return self.run(category, plans, observer);
        }
        observer.on_batch_start(category, plans.len());

        let chunk = plans.len().div_ceil(shards);
        let segments: Vec<Segment<'_>> = plans
            .chunks(chunk)
            .enumerate()
            .map(|(i, part)| Segment {
                log_path: self.shard_log_path(category, i),
                base:     i * chunk,
                plans:    part,
                total:    plans.len(),
            })
            .collect();
        info!("{category}: routing {} sources in {} shards", plans.len(), segments.len());

        let shared = Mutex::new(&mut *observer);
        let results: Vec<BatchResult<SegmentOutcome>> = segments
            .par_iter()
            .map(|segment| {
                let mut forward = SharedObserver { inner: &shared };
                self.run_segment(segment, segment.plans.len(), &mut forward)
            })
            .collect();
        drop(shared);

        let mut table = ResultTable::new();
        let mut report = BatchReport::default();
        let mut logs = Vec::with_capacity(results.len());
        for result in results {
            let SegmentOutcome { table: part, report: part_report, log } = result?;
            table.merge_table(&part);
            report.absorb(&part_report);
            logs.push(log);
        }

        info!(
            "{category}: {} sources done ({} routed, {} skipped, {} best-effort), {} targets reached",
            report.sources, report.routed, report.skipped, report.best_effort, table.len()
        );
        observer.on_batch_end(category, &report);
        Ok(CategoryOutcome::new(table, report, logs))
    }
}
