//! Plain data row type written by output backends.

/// Final distance for one target point.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRow {
    pub target_id: String,
    pub distance:  f64,
}
