//! Bounded, ephemeral views of the road network.
//!
//! A [`Subgraph`] re-indexes the nodes it touches into a dense local range
//! `0..node_count()` so shortest-path search can use plain `Vec`s sized to
//! the subgraph rather than to the national network.  It owns its data and
//! never mutates the [`RoadNetwork`] it was cut from.

use rustc_hash::{FxHashMap, FxHashSet};

use ax_core::{EdgeId, NodeId, Weight};

use crate::components::DisjointSet;
use crate::network::RoadNetwork;

/// Undirected weighted graph over a subset of network nodes.
#[derive(Clone, Debug, Default)]
pub struct Subgraph {
    /// Local index → network `NodeId`.
    nodes:     Vec<NodeId>,
    /// Network `NodeId` → local index.
    local:     FxHashMap<NodeId, u32>,
    /// `(a, b, cost)` in local indices, one entry per network edge.
    edges:     Vec<(u32, u32, f64)>,
    /// CSR over `adj`, length `nodes.len() + 1`.
    adj_start: Vec<u32>,
    adj:       Vec<(u32, f64)>,
}

impl Subgraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_network(network: &RoadNetwork, node_ids: &[NodeId], weight: Weight) -> Self {
        let mut seen: FxHashSet<EdgeId> = FxHashSet::default();
        let mut builder = SubgraphBuilder::default();
        for &node in node_ids {
            if !network.contains(node) {
                continue;
            }
            for edge in network.incident_edges(node) {
                if seen.insert(edge) {
                    builder.push(
                        network.edge_from[edge.index()],
                        network.edge_to[edge.index()],
                        network.edge_cost(edge, weight),
                    );
                }
            }
        }
        builder.finish()
    }

    // ── Dimensions & lookup ───────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.local.contains_key(&node)
    }

    #[inline]
    pub fn local_index(&self, node: NodeId) -> Option<usize> {
        self.local.get(&node).map(|&i| i as usize)
    }

    /// Network id of local node `local`.
    #[inline]
    pub fn node_id(&self, local: usize) -> NodeId {
        self.nodes[local]
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// `(neighbour_local, cost)` for every edge at local node `local`.
    #[inline]
    pub fn neighbors(&self, local: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.adj_start[local] as usize;
        let end   = self.adj_start[local + 1] as usize;
        self.adj[start..end].iter().map(|&(n, c)| (n as usize, c))
    }

    // ── Connectivity ──────────────────────────────────────────────────────

    /// The connected component containing `node`, or `None` if `node` is not
    /// part of this subgraph.
    pub fn component_containing(&self, node: NodeId) -> Option<Subgraph> {
        let start = self.local_index(node)?;

        let mut set = DisjointSet::new(self.node_count());
        for &(a, b, _) in &self.edges {
            set.union(a as usize, b as usize);
        }
        if set.set_count() == 1 {
            return Some(self.clone());
        }

        let root = set.find(start);
        let mut builder = SubgraphBuilder::default();
        for &(a, b, cost) in &self.edges {
            if set.find(a as usize) == root {
                builder.push(self.nodes[a as usize], self.nodes[b as usize], cost);
            }
        }
        Some(builder.finish())
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct SubgraphBuilder {
    nodes: Vec<NodeId>,
    local: FxHashMap<NodeId, u32>,
    edges: Vec<(u32, u32, f64)>,
}

impl SubgraphBuilder {
    fn intern(&mut self, node: NodeId) -> u32 {
        let next = self.nodes.len() as u32;
        *self.local.entry(node).or_insert_with(|| {
            self.nodes.push(node);
            next
        })
    }

    fn push(&mut self, from: NodeId, to: NodeId, cost: f64) {
        let a = self.intern(from);
        let b = self.intern(to);
        self.edges.push((a, b, cost));
    }

    fn finish(self) -> Subgraph {
        let n = self.nodes.len();

        let mut adj_start = vec![0u32; n + 1];
        for &(a, b, _) in &self.edges {
            if a != b {
                adj_start[a as usize + 1] += 1;
                adj_start[b as usize + 1] += 1;
            }
        }
        for i in 1..=n {
            adj_start[i] += adj_start[i - 1];
        }

        let mut cursor: Vec<u32> = adj_start[..n].to_vec();
        let mut adj = vec![(0u32, 0.0f64); adj_start[n] as usize];
        for &(a, b, cost) in &self.edges {
            if a == b {
                continue;
            }
            adj[cursor[a as usize] as usize] = (b, cost);
            cursor[a as usize] += 1;
            adj[cursor[b as usize] as usize] = (a, cost);
            cursor[b as usize] += 1;
        }

        Subgraph {
            nodes: self.nodes,
            local: self.local,
            edges: self.edges,
            adj_start,
            adj,
        }
    }
}
