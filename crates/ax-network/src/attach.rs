//! Network attachment: turning off-network points into graph nodes.
//!
//! Each point gets a brand-new node at its own coordinates plus `k`
//! connector edges to the `k` nearest nodes that existed *before* the batch
//! was attached.  Neighbours are resolved for the whole batch first, so
//! points in one batch never connect to each other.
//!
//! Connector weights:
//!
//! ```text
//! length_m = euclidean_distance + epsilon
//! time_min = (length_m / 1000) / speed_kmh * 60
//! ```

use log::{debug, info};

use ax_core::{AttachedPoint, EngineConfig, NodeId, Point};

use crate::network::{Edge, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

/// Parameters for [`attach`].  Usually derived from an [`EngineConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttachParams {
    pub k:         usize,
    pub epsilon:   f64,
    pub speed_kmh: f64,
}

impl AttachParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            k:         config.attach_k,
            epsilon:   config.connector_epsilon,
            speed_kmh: config.assumed_speed_kmh,
        }
    }

    #[inline]
    fn time_min(&self, length_m: f64) -> f64 {
        (length_m / 1_000.0) / self.speed_kmh * 60.0
    }
}

/// Attach `points` to the network held by `builder`.
///
/// Points that already carry a `node` are checked for existence and passed
/// through unchanged.  Every other point receives a fresh `NodeId` appended
/// past the current maximum.  The returned vector is parallel to `points`.
///
/// # Errors
///
/// - [`NetworkError::InvalidK`] if `params.k == 0`.
/// - [`NetworkError::NonFiniteCoord`] for NaN/infinite coordinates.
/// - [`NetworkError::NodeNotFound`] for a pre-attached id outside the network.
/// - [`NetworkError::EmptyNetwork`] if there is nothing to connect to.
pub fn attach(
    builder: &mut RoadNetworkBuilder,
    points:  &[Point],
    params:  &AttachParams,
) -> NetworkResult<Vec<AttachedPoint>> {
    if params.k == 0 {
        return Err(NetworkError::InvalidK);
    }

    // ── Phase 1: validate and resolve neighbours against existing nodes ───
    let mut plans: Vec<Option<Vec<(NodeId, f64)>>> = Vec::with_capacity(points.len());
    for point in points {
        if !point.coord.is_finite() {
            return Err(NetworkError::NonFiniteCoord { id: point.id.clone() });
        }
        match point.node {
            Some(node) if builder.contains(node) => plans.push(None),
            Some(node) => return Err(NetworkError::NodeNotFound(node)),
            None => {
                if builder.is_empty() {
                    return Err(NetworkError::EmptyNetwork);
                }
                plans.push(Some(builder.k_nearest(point.coord, params.k)));
            }
        }
    }

    // ── Phase 2: append nodes and connector edges ─────────────────────────
    let mut attached = Vec::with_capacity(points.len());
    let mut new_nodes = 0usize;
    for (point, plan) in points.iter().zip(plans) {
        let node = match plan {
            None => point.node.unwrap_or_default(),
            Some(neighbours) => {
                let node = builder.add_node(point.coord);
                for (nearest, dist) in neighbours {
                    let length_m = dist + params.epsilon;
                    builder.add_edge(Edge::new(node, nearest, length_m, params.time_min(length_m)))?;
                }
                new_nodes += 1;
                node
            }
        };
        attached.push(AttachedPoint::new(point.id.clone(), point.coord, node));
    }

    debug!(
        "attached {new_nodes} new nodes ({} pre-attached), k = {}",
        points.len() - new_nodes,
        params.k
    );
    if new_nodes > 0 {
        info!(
            "network now has {} nodes and {} edges",
            builder.node_count(),
            builder.edge_count()
        );
    }
    Ok(attached)
}
