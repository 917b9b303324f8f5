//! Merging disconnected links (ferry routes) into the road network.
//!
//! A link arrives as two free-standing coordinates with its own length and
//! travel time.  Each endpoint is snapped to the nearest existing node and
//! the link becomes an ordinary edge between those nodes.

use log::debug;

use ax_core::Coord;

use crate::network::{Edge, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

/// A route segment whose endpoints are coordinates, not node ids.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub from:     Coord,
    pub to:       Coord,
    pub length_m: f64,
    pub time_min: f64,
}

/// Snap every link in `links` onto `builder` and add it as an edge.
///
/// Links whose endpoints snap to the same node are skipped.  Returns the
/// number of edges added.
pub fn merge_links(builder: &mut RoadNetworkBuilder, links: &[Link]) -> NetworkResult<usize> {
    if links.is_empty() {
        return Ok(0);
    }
    if builder.is_empty() {
        return Err(NetworkError::EmptyNetwork);
    }

    let mut added = 0usize;
    for (i, link) in links.iter().enumerate() {
        if !(link.from.is_finite() && link.to.is_finite()) {
            return Err(NetworkError::NonFiniteCoord { id: format!("link {i}") });
        }
        let (Some((from, _)), Some((to, _))) =
            (builder.nearest_node(link.from), builder.nearest_node(link.to))
        else {
            return Err(NetworkError::EmptyNetwork);
        };
        if from == to {
            debug!("link {i} collapses onto {from}; skipped");
            continue;
        }
        builder.add_edge(Edge::new(from, to, link.length_m, link.time_min))?;
        added += 1;
    }
    debug!("merged {added} of {} links", links.len());
    Ok(added)
}
