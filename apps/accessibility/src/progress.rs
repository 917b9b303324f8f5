//! Progress bar driven by batch callbacks.

use indicatif::{ProgressBar, ProgressStyle};

use ax_batch::{BatchObserver, BatchReport};
use ax_route::SourceOutcome;

const TEMPLATE: &str = "{spinner:.green} {prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}, ETA {eta}) {msg}";

/// One bar per category; best-effort sources are counted in the message.
#[derive(Default)]
pub struct ProgressObserver {
    bar:         Option<ProgressBar>,
    best_effort: usize,
}

impl BatchObserver for ProgressObserver {
    fn on_batch_start(&mut self, category: &str, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_prefix(category.to_string());
        self.bar = Some(bar);
        self.best_effort = 0;
    }

    fn on_resume(&mut self, skipped: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(skipped as u64);
        }
    }

    fn on_source_done(&mut self, outcome: &SourceOutcome) {
        let Some(bar) = &self.bar else {
            return;
        };
        if outcome.is_best_effort() {
            self.best_effort += 1;
            bar.set_message(format!("{} best-effort", self.best_effort));
        }
        bar.inc(1);
    }

    fn on_batch_end(&mut self, _category: &str, report: &BatchReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(format!(
                "{} routed, {} resumed, {} best-effort",
                report.routed, report.skipped, report.best_effort
            ));
        }
    }
}
