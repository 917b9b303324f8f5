//! Shortest-path backend trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The router calls single-source search through [`ShortestPathBackend`], so
//! buffer growth and checkpointing stay independent of how distances are
//! computed.  [`DijkstraBackend`] is the only implementation shipped.
//!
//! # Cost units
//!
//! Costs are whatever the subgraph was built with (`Weight::Time` minutes or
//! `Weight::Length` metres).  All edge costs are non-negative.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use ax_core::NodeId;
use ax_network::Subgraph;

// ── Backend trait ─────────────────────────────────────────────────────────────

/// Pluggable single-source shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one backend can serve every
/// worker of a sharded run.
pub trait ShortestPathBackend: Send + Sync {
    /// Distances from `source` to every node of `graph` it can reach, as
    /// `(network node, cost)` pairs.  The source itself is included at cost
    /// 0.  Nodes costlier than `cutoff` are omitted.
    ///
    /// Returns an empty vector if `source` is not in `graph`.
    fn shortest_paths(
        &self,
        graph:  &Subgraph,
        source: NodeId,
        cutoff: Option<f64>,
    ) -> Vec<(NodeId, f64)>;
}

// ── DijkstraBackend ───────────────────────────────────────────────────────────

/// Binary-heap Dijkstra over a subgraph's local CSR.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraBackend;

impl ShortestPathBackend for DijkstraBackend {
    fn shortest_paths(
        &self,
        graph:  &Subgraph,
        source: NodeId,
        cutoff: Option<f64>,
    ) -> Vec<(NodeId, f64)> {
        let Some(start) = graph.local_index(source) else {
            return Vec::new();
        };
        let limit = cutoff.unwrap_or(f64::INFINITY);

        // dist[v] = best known cost to local node v.
        let mut dist = vec![f64::INFINITY; graph.node_count()];
        let mut settled = Vec::new();
        dist[start] = 0.0;

        // Reverse turns the max-heap into a min-heap.
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(0.0), start)));

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            // Skip stale heap entries.
            if cost > dist[node] {
                continue;
            }
            settled.push((graph.node_id(node), cost));

            for (neighbor, edge_cost) in graph.neighbors(node) {
                let new_cost = cost + edge_cost;
                if new_cost < dist[neighbor] && new_cost <= limit {
                    dist[neighbor] = new_cost;
                    heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
                }
            }
        }
        settled
    }
}
