//! Off-network points: sources (points of interest) and targets (postal
//! delivery points).

use crate::{Coord, NodeId};

/// A point read from an input table, before network attachment.
///
/// `node` is `Some` when the input row already carries a graph node id; such
/// points are validated against the network instead of being re-attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub id:    String,
    pub coord: Coord,
    pub node:  Option<NodeId>,
}

impl Point {
    pub fn new(id: impl Into<String>, coord: Coord) -> Self {
        Self { id: id.into(), coord, node: None }
    }

    /// Mark this point as pre-attached to `node`.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

/// A point that owns exactly one graph node.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedPoint {
    pub id:    String,
    pub coord: Coord,
    pub node:  NodeId,
}

impl AttachedPoint {
    pub fn new(id: impl Into<String>, coord: Coord, node: NodeId) -> Self {
        Self { id: id.into(), coord, node }
    }
}
