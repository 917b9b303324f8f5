//! `ax-core`: foundational types for the accessibility routing engine.
//!
//! Every other `ax-*` crate depends on this one.  It has no `ax-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`, `BatchIndex`                             |
//! | [`geo`]    | `Coord` (planar easting/northing), Euclidean distance        |
//! | [`point`]  | `Point` (off-network), `AttachedPoint` (owns a `NodeId`)     |
//! | [`record`] | `DistanceRecord`, one (source, target) routing result        |
//! | [`config`] | `EngineConfig`, `Weight`, `EstimateMode`, `BufferGrowth`     |
//! | [`error`]  | `CoreError`, `CoreResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, `Coord` and config. |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod point;
pub mod record;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{BufferGrowth, EngineConfig, EstimateMode, Weight};
pub use error::{CoreError, CoreResult};
pub use geo::Coord;
pub use ids::{BatchIndex, EdgeId, NodeId};
pub use point::{AttachedPoint, Point};
pub use record::DistanceRecord;
