//! `ax-route`: everything between an attached network and per-source
//! distance records.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`estimate`] | Reachability estimator: initial buffer + required targets   |
//! | [`backend`]  | `ShortestPathBackend` trait, `DijkstraBackend`              |
//! | [`router`]   | `AdaptiveRouter`: grow a bounded subgraph until sufficient  |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                              |
//!
//! # Per-source flow
//!
//! ```text
//! SourcePlan ─▶ box query ─▶ Subgraph ─▶ component of source ─▶ sufficient? ─┬─▶ Dijkstra ─▶ DistanceRecords
//!                  ▲                                                          │
//!                  └────────────────────── grow radius ◀──── no, < max ──────┘
//! ```

pub mod backend;
pub mod error;
pub mod estimate;
pub mod router;


pub use backend::{DijkstraBackend, ShortestPathBackend};
pub use error::{RouteError, RouteResult};
pub use estimate::{SourcePlan, dedup_sources, estimate_reach};
pub use router::{AdaptiveRouter, Coverage, SourceOutcome};
