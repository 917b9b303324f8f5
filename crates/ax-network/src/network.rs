//! Road network representation and builder.
//!
//! # Two phases
//!
//! - [`RoadNetworkBuilder`] is the append-only phase: nodes and edges are
//!   added (loader, ferry links, point attachment) and nearest-node queries
//!   are answered from an incrementally maintained R-tree.
//! - [`RoadNetwork`] is the read-only phase used during routing.  It is
//!   `Send + Sync` and can be shared by parallel workers.
//!
//! # Data layout
//!
//! Edges are undirected for traversal.  Each stored edge appears in the
//! **incidence CSR** of both of its endpoints:
//!
//! ```text
//! inc_edge[ node_inc_start[n] .. node_inc_start[n+1] ]
//! ```
//!
//! Parallel edges are kept as-is; shortest-path relaxation picks the cheapest.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[easting, northing]` answers both
//! nearest-node queries (attachment) and axis-aligned box queries (subgraph
//! extraction) in logarithmic time.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use ax_core::{Coord, EdgeId, NodeId, Weight};

use crate::components::{ComponentSummary, DisjointSet};
use crate::subgraph::Subgraph;
use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [easting, northing]
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let de = self.point[0] - point[0];
        let dn = self.point[1] - point[1];
        de * de + dn * dn
    }
}

fn bulk_index(nodes: &[Coord]) -> RTree<NodeEntry> {
    let entries: Vec<NodeEntry> = nodes
        .iter()
        .enumerate()
        .map(|(i, c)| NodeEntry { point: c.to_array(), id: NodeId(i as u32) })
        .collect();
    RTree::bulk_load(entries)
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// One row of the edge table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub from:     NodeId,
    pub to:       NodeId,
    /// Metres.
    pub length_m: f64,
    /// Minutes.
    pub time_min: f64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, length_m: f64, time_min: f64) -> Self {
        Self { from, to, length_m, time_min }
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Append-only graph store.  Call [`build`](Self::build) once all nodes and
/// edges (including attached points) are in.
///
/// # Example
///
/// ```
/// use ax_core::{Coord, NodeId};
/// use ax_network::{Edge, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Coord::new(0.0, 0.0));
/// let c = b.add_node(Coord::new(1_200.0, 0.0));
/// b.add_edge(Edge::new(a, c, 1_200.0, 1.5)).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.degree(NodeId(0)), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RoadNetworkBuilder {
    nodes:       Vec<Coord>,
    edges:       Vec<Edge>,
    /// Built lazily on the first nearest-node query, then kept in sync by
    /// `add_node`.
    spatial_idx: Option<RTree<NodeEntry>>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:       Vec::with_capacity(nodes),
            edges:       Vec::with_capacity(edges),
            spatial_idx: None,
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Coord) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        if let Some(idx) = self.spatial_idx.as_mut() {
            idx.insert(NodeEntry { point: pos.to_array(), id });
        }
        id
    }

    /// Append nodes in order; returns how many were added.
    pub fn add_nodes<I: IntoIterator<Item = Coord>>(&mut self, nodes: I) -> usize {
        let before = self.nodes.len();
        for pos in nodes {
            self.add_node(pos);
        }
        self.nodes.len() - before
    }

    /// Add one edge.  Both endpoints must already exist and both weights must
    /// be finite and non-negative.
    pub fn add_edge(&mut self, edge: Edge) -> NetworkResult<EdgeId> {
        let index = self.edges.len();
        for node in [edge.from, edge.to] {
            if node.index() >= self.nodes.len() {
                return Err(NetworkError::EdgeEndpointMissing { index, node });
            }
        }
        for value in [edge.length_m, edge.time_min] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(NetworkError::InvalidWeight { index, value });
            }
        }
        self.edges.push(edge);
        Ok(EdgeId(index as u32))
    }

    /// Append edges in order; returns how many were added.
    pub fn add_edges<I: IntoIterator<Item = Edge>>(&mut self, edges: I) -> NetworkResult<usize> {
        let before = self.edges.len();
        for edge in edges {
            self.add_edge(edge)?;
        }
        Ok(self.edges.len() - before)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Coord {
        self.nodes[id.index()]
    }

    /// Nearest existing node to `pos` and its Euclidean distance.
    ///
    /// Returns `None` only if the builder has no nodes.
    pub fn nearest_node(&mut self, pos: Coord) -> Option<(NodeId, f64)> {
        self.k_nearest(pos, 1).into_iter().next()
    }

    /// Up to `k` nearest existing nodes to `pos`, ascending by distance.
    /// Caps at the number of nodes.
    pub fn k_nearest(&mut self, pos: Coord, k: usize) -> Vec<(NodeId, f64)> {
        self.index()
            .nearest_neighbor_iter_with_distance_2(&pos.to_array())
            .take(k)
            .map(|(e, d2)| (e.id, d2.sqrt()))
            .collect()
    }

    fn index(&mut self) -> &RTree<NodeEntry> {
        self.spatial_idx.get_or_insert_with(|| bulk_index(&self.nodes))
    }

    /// Consume the builder and produce a read-only [`RoadNetwork`].
    ///
    /// Time complexity: O(N + E) for the incidence CSR plus O(N log N) for
    /// the R-tree bulk load (skipped if attachment already built one).
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();

        let edge_from:     Vec<NodeId> = self.edges.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = self.edges.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = self.edges.iter().map(|e| e.length_m).collect();
        let edge_time_min: Vec<f64>    = self.edges.iter().map(|e| e.time_min).collect();

        // Count incidences per node; a self-loop is listed once.
        let mut node_inc_start = vec![0u32; node_count + 1];
        for e in &self.edges {
            node_inc_start[e.from.index() + 1] += 1;
            if e.to != e.from {
                node_inc_start[e.to.index() + 1] += 1;
            }
        }
        for i in 1..=node_count {
            node_inc_start[i] += node_inc_start[i - 1];
        }

        let mut cursor: Vec<u32> = node_inc_start[..node_count].to_vec();
        let mut inc_edge = vec![EdgeId::INVALID; node_inc_start[node_count] as usize];
        for (i, e) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            inc_edge[cursor[e.from.index()] as usize] = id;
            cursor[e.from.index()] += 1;
            if e.to != e.from {
                inc_edge[cursor[e.to.index()] as usize] = id;
                cursor[e.to.index()] += 1;
            }
        }

        let spatial_idx = match self.spatial_idx {
            Some(idx) => idx,
            None => bulk_index(&self.nodes),
        };

        RoadNetwork {
            node_pos: self.nodes,
            node_inc_start,
            inc_edge,
            edge_from,
            edge_to,
            edge_length_m,
            edge_time_min,
            spatial_idx,
        }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Read-only road graph: incidence CSR plus a spatial index.
///
/// Fields are `pub` for direct indexed access on hot paths.  Construct with
/// [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Coord>,

    /// CSR row pointer.  Edges incident to node `n` are
    /// `inc_edge[node_inc_start[n] .. node_inc_start[n+1]]`.
    pub node_inc_start: Vec<u32>,

    pub inc_edge: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId = insertion order) ───────────────────
    pub edge_from:     Vec<NodeId>,
    pub edge_to:       Vec<NodeId>,
    pub edge_length_m: Vec<f64>,
    pub edge_time_min: Vec<f64>,

    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// An empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `EdgeId`s of all edges touching `node`.  Contiguous range, no allocation.
    #[inline]
    pub fn incident_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_inc_start[node.index()] as usize;
        let end   = self.node_inc_start[node.index() + 1] as usize;
        self.inc_edge[start..end].iter().copied()
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_inc_start[node.index()] as usize;
        let end   = self.node_inc_start[node.index() + 1] as usize;
        end - start
    }

    /// Endpoint of `edge` that is not `node` (or `node` for a self-loop).
    #[inline]
    pub fn opposite(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let from = self.edge_from[edge.index()];
        if from == node { self.edge_to[edge.index()] } else { from }
    }

    #[inline]
    pub fn edge_cost(&self, edge: EdgeId, weight: Weight) -> f64 {
        match weight {
            Weight::Time   => self.edge_time_min[edge.index()],
            Weight::Length => self.edge_length_m[edge.index()],
        }
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// All nodes inside the axis-aligned square of half-width `half_width`
    /// centred on `center` (boundary inclusive).
    pub fn nodes_in_box(&self, center: Coord, half_width: f64) -> Vec<NodeId> {
        let envelope = AABB::from_corners(
            [center.easting - half_width, center.northing - half_width],
            [center.easting + half_width, center.northing + half_width],
        );
        self.spatial_idx
            .locate_in_envelope(&envelope)
            .map(|e| e.id)
            .collect()
    }

    /// Nearest node to `pos`.  `None` only for an empty network.
    pub fn snap_to_node(&self, pos: Coord) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&pos.to_array())
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Coord, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&pos.to_array())
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    // ── Subgraphs & connectivity ──────────────────────────────────────────

    /// Subgraph of every edge with at least one endpoint in `node_ids`.
    ///
    /// One-hop neighbours outside the set are pulled in with those edges.
    /// Ids not present in the network are ignored; an empty input yields an
    /// empty subgraph.
    pub fn build_subgraph(&self, node_ids: &[NodeId], weight: Weight) -> Subgraph {
        Subgraph::from_network(self, node_ids, weight)
    }

    /// Connected-component statistics for the whole network.
    pub fn component_summary(&self) -> ComponentSummary {
        let n = self.node_count();
        let mut set = DisjointSet::new(n);
        for (from, to) in self.edge_from.iter().zip(&self.edge_to) {
            set.union(from.index(), to.index());
        }
        let isolated = (0..n).filter(|&i| self.degree(NodeId(i as u32)) == 0).count();
        ComponentSummary {
            count:    set.set_count(),
            largest:  set.largest_set(),
            isolated,
        }
    }
}
