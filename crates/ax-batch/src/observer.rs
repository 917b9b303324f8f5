//! Batch observer trait for progress reporting.

use ax_route::SourceOutcome;

use crate::BatchReport;

/// Callbacks invoked by [`BatchRunner`][crate::BatchRunner] while a category
/// is routed.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: best-effort counter
///
/// ```rust,ignore
/// struct Degraded(usize);
///
/// impl BatchObserver for Degraded {
///     fn on_source_done(&mut self, outcome: &SourceOutcome) {
///         if outcome.is_best_effort() {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait BatchObserver {
    /// Called once before any source is routed.  `total` counts every source
    /// in the category, including ones a resumed run will skip.
    fn on_batch_start(&mut self, _category: &str, _total: usize) {}

    /// Called when a checkpoint log lets `skipped` sources be skipped.  In a
    /// sharded run this fires once per resumed shard.
    fn on_resume(&mut self, _skipped: usize) {}

    /// Called after each source has been routed and durably logged.
    fn on_source_done(&mut self, _outcome: &SourceOutcome) {}

    /// Called once after the category's result table is complete.
    fn on_batch_end(&mut self, _category: &str, _report: &BatchReport) {}
}

/// A [`BatchObserver`] that does nothing.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}
