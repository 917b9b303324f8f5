//! Per-source routing output.

use crate::{BatchIndex, NodeId};

/// Shortest distance from one source to one reachable target node.
///
/// A target absent from a source's records has no known path from that
/// source; it is never represented as zero or infinity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceRecord {
    pub target:      NodeId,
    /// Path cost in the configured [`Weight`](crate::Weight) units.
    pub distance:    f64,
    pub batch_index: BatchIndex,
}
