//! `ax-batch`: runs whole categories of sources through the router.
//!
//! # Per-category flow
//!
//! ```text
//! Pipeline::prepare ─▶ attach sources ─▶ dedup ─▶ build ─▶ estimate_reach
//!         │
//!         ▼
//! BatchRunner::run ─▶ replay log ─▶ for each source: route ─▶ append log ─▶ min-merge
//!                                                      └─▶ BatchObserver::on_source_done
//!         │
//!         ▼
//! CategoryOutcome { table, report } ─▶ caller exports ─▶ finish() deletes the log
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                             |
//! |------------|----------------------------------------------------|
//! | `parallel` | `BatchRunner::run_sharded` routes shards on Rayon. |
//! | `serde`    | Propagates serde derives to the lower crates.      |

pub mod error;
pub mod observer;
pub mod pipeline;
pub mod runner;

#[cfg(feature = "parallel")]
pub mod shard;

#[cfg(test)]
mod tests;

pub use error::{BatchError, BatchResult};
pub use observer::{BatchObserver, NoopObserver};
pub use pipeline::{Pipeline, PreparedCategory};
pub use runner::{BatchReport, BatchRunner, CategoryOutcome};
