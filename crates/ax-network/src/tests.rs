//! Unit tests for ax-network.
//!
//! All tests use hand-crafted networks so they run without any input files.

#[cfg(test)]
mod helpers {
    use ax_core::{Coord, NodeId};
    use crate::{Edge, RoadNetworkBuilder};

    /// Five nodes on a line 100 m apart, joined in order.
    ///
    /// ```text
    /// 0 ── 1 ── 2 ── 3 ── 4      (x = 0, 100, 200, 300, 400; y = 0)
    /// ```
    pub fn line_builder() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        for i in 0..5 {
            b.add_node(Coord::new(i as f64 * 100.0, 0.0));
        }
        for i in 0..4 {
            b.add_edge(Edge::new(NodeId(i), NodeId(i + 1), 100.0, 1.0)).unwrap();
        }
        b
    }

    /// Two triangles far apart with no edge between them.
    ///
    /// ```text
    /// 0,1,2 near the origin      3,4,5 near (10 000, 0)
    /// ```
    pub fn two_triangles() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        for base in [0.0, 10_000.0] {
            b.add_node(Coord::new(base, 0.0));
            b.add_node(Coord::new(base + 50.0, 0.0));
            b.add_node(Coord::new(base, 50.0));
        }
        for base in [0u32, 3] {
            b.add_edge(Edge::new(NodeId(base), NodeId(base + 1), 50.0, 0.5)).unwrap();
            b.add_edge(Edge::new(NodeId(base + 1), NodeId(base + 2), 70.0, 0.7)).unwrap();
            b.add_edge(Edge::new(NodeId(base + 2), NodeId(base), 50.0, 0.5)).unwrap();
        }
        b
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ax_core::{Coord, NodeId, Weight};
    use crate::{Edge, NetworkError, RoadNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.snap_to_node(Coord::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn incidence_lists_both_endpoints() {
        let net = super::helpers::line_builder().build();
        assert_eq!(net.degree(NodeId(0)), 1);
        assert_eq!(net.degree(NodeId(2)), 2);
        for e in net.incident_edges(NodeId(2)) {
            let other = net.opposite(e, NodeId(2));
            assert!(other == NodeId(1) || other == NodeId(3));
        }
    }

    #[test]
    fn self_loop_listed_once() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        b.add_edge(Edge::new(a, a, 10.0, 0.1)).unwrap();
        let net = b.build();
        assert_eq!(net.degree(a), 1);
    }

    #[test]
    fn missing_endpoint_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let err = b.add_edge(Edge::new(a, NodeId(9), 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, NetworkError::EdgeEndpointMissing { node: NodeId(9), .. }));
    }

    #[test]
    fn negative_and_nan_weights_rejected() {
        let mut b = super::helpers::line_builder();
        assert!(matches!(
            b.add_edge(Edge::new(NodeId(0), NodeId(4), -1.0, 1.0)),
            Err(NetworkError::InvalidWeight { .. })
        ));
        assert!(matches!(
            b.add_edge(Edge::new(NodeId(0), NodeId(4), 1.0, f64::NAN)),
            Err(NetworkError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn edge_cost_follows_weight() {
        let net = super::helpers::line_builder().build();
        let e = net.incident_edges(NodeId(0)).next().unwrap();
        assert_eq!(net.edge_cost(e, Weight::Length), 100.0);
        assert_eq!(net.edge_cost(e, Weight::Time), 1.0);
    }

    #[test]
    fn nearest_tracks_nodes_added_after_first_query() {
        let mut b = super::helpers::line_builder();
        assert_eq!(b.nearest_node(Coord::new(1_000.0, 0.0)).unwrap().0, NodeId(4));
        let late = b.add_node(Coord::new(990.0, 0.0));
        let (id, d) = b.nearest_node(Coord::new(1_000.0, 0.0)).unwrap();
        assert_eq!(id, late);
        assert!((d - 10.0).abs() < 1e-9);
    }

    #[test]
    fn k_nearest_sorted_and_capped() {
        let mut b = super::helpers::line_builder();
        let near = b.k_nearest(Coord::new(210.0, 0.0), 3);
        let ids: Vec<_> = near.iter().map(|(n, _)| *n).collect();
        assert_eq!(ids, vec![NodeId(2), NodeId(3), NodeId(1)]);
        assert!(near.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(b.k_nearest(Coord::new(0.0, 0.0), 50).len(), 5);
    }

    #[test]
    fn component_summary_counts_islands() {
        let mut b = super::helpers::two_triangles();
        b.add_node(Coord::new(-500.0, -500.0));
        let summary = b.build().component_summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.largest, 3);
        assert_eq!(summary.isolated, 1);
    }
}

// ── Box query & subgraphs ─────────────────────────────────────────────────────

#[cfg(test)]
mod subgraph {
    use ax_core::{Coord, NodeId, Weight};

    #[test]
    fn box_query_is_inclusive() {
        let net = super::helpers::line_builder().build();
        let mut inside = net.nodes_in_box(Coord::new(200.0, 0.0), 100.0);
        inside.sort();
        assert_eq!(inside, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn box_query_matches_brute_force() {
        let net = super::helpers::two_triangles().build();
        let center = Coord::new(30.0, 10.0);
        for half in [0.0, 20.0, 45.0, 60.0, 20_000.0] {
            let mut got = net.nodes_in_box(center, half);
            got.sort();
            let want: Vec<_> = (0..net.node_count() as u32)
                .map(NodeId)
                .filter(|n| net.node_pos[n.index()].within_box(center, half))
                .collect();
            assert_eq!(got, want, "half width {half}");
        }
    }

    #[test]
    fn subgraph_pulls_in_one_hop_neighbours() {
        let net = super::helpers::line_builder().build();
        let sub = net.build_subgraph(&[NodeId(2)], Weight::Length);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert!(sub.contains(NodeId(1)) && sub.contains(NodeId(3)));
        assert!(!sub.contains(NodeId(0)));
    }

    #[test]
    fn shared_edges_not_duplicated() {
        let net = super::helpers::line_builder().build();
        let sub = net.build_subgraph(&[NodeId(1), NodeId(2)], Weight::Time);
        assert_eq!(sub.edge_count(), 3);
        let local = sub.local_index(NodeId(2)).unwrap();
        let costs: Vec<f64> = sub.neighbors(local).map(|(_, c)| c).collect();
        assert_eq!(costs, vec![1.0, 1.0]);
    }

    #[test]
    fn empty_and_unknown_ids_give_empty_subgraph() {
        let net = super::helpers::line_builder().build();
        assert!(net.build_subgraph(&[], Weight::Time).is_empty());
        assert!(net.build_subgraph(&[NodeId(99)], Weight::Time).is_empty());
    }

    #[test]
    fn component_keeps_only_source_side() {
        let net = super::helpers::two_triangles().build();
        let all: Vec<NodeId> = (0..6).map(NodeId).collect();
        let sub = net.build_subgraph(&all, Weight::Length);
        assert_eq!(sub.node_count(), 6);

        let comp = sub.component_containing(NodeId(4)).unwrap();
        let mut nodes = comp.nodes().to_vec();
        nodes.sort();
        assert_eq!(nodes, vec![NodeId(3), NodeId(4), NodeId(5)]);
        assert_eq!(comp.edge_count(), 3);
        assert!(sub.component_containing(NodeId(42)).is_none());
    }
}

// ── Union-find ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod components {
    use crate::DisjointSet;

    #[test]
    fn union_merges_and_counts() {
        let mut set = DisjointSet::new(5);
        assert_eq!(set.set_count(), 5);
        assert!(set.union(0, 1));
        assert!(set.union(1, 2));
        assert!(!set.union(0, 2));
        assert_eq!(set.set_count(), 3);
        assert_eq!(set.set_size(2), 3);
        assert_eq!(set.largest_set(), 3);
        assert_eq!(set.find(0), set.find(2));
        assert_ne!(set.find(0), set.find(3));
    }

    #[test]
    fn empty_set() {
        let set = DisjointSet::new(0);
        assert!(set.is_empty());
        assert_eq!(set.largest_set(), 0);
    }
}

// ── Attachment ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod attach {
    use ax_core::{Coord, EngineConfig, NodeId, Point};
    use crate::{AttachParams, NetworkError, RoadNetworkBuilder, attach};

    fn params(k: usize) -> AttachParams {
        AttachParams { k, ..AttachParams::from_config(&EngineConfig::default()) }
    }

    #[test]
    fn new_nodes_appended_with_connectors() {
        let mut b = super::helpers::line_builder();
        let points = vec![
            Point::new("a", Coord::new(110.0, 30.0)),
            Point::new("b", Coord::new(390.0, -5.0)),
        ];
        let out = attach(&mut b, &points, &params(1)).unwrap();
        assert_eq!(out[0].node, NodeId(5));
        assert_eq!(out[1].node, NodeId(6));
        assert_eq!(out[0].id, "a");
        assert_eq!(b.edge_count(), 4 + 2);

        let net = b.build();
        let e = net.incident_edges(NodeId(5)).next().unwrap();
        assert_eq!(net.opposite(e, NodeId(5)), NodeId(1));
        let expected = (10.0f64 * 10.0 + 30.0 * 30.0).sqrt() + 0.01;
        assert!((net.edge_length_m[e.index()] - expected).abs() < 1e-9);
        let cfg = EngineConfig::default();
        assert!((net.edge_time_min[e.index()] - cfg.connector_time_min(expected)).abs() < 1e-12);
    }

    #[test]
    fn connects_to_brute_force_nearest() {
        let mut b = super::helpers::two_triangles();
        let existing: Vec<Coord> = (0..b.node_count() as u32).map(|i| b.node_pos(NodeId(i))).collect();
        let points: Vec<Point> = [(-20.0, 5.0), (60.0, 60.0), (9_990.0, 70.0), (5_000.0, 0.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(i.to_string(), Coord::new(x, y)))
            .collect();
        let out = attach(&mut b, &points, &params(1)).unwrap();
        let net = b.build();
        for (p, a) in points.iter().zip(&out) {
            let best = existing
                .iter()
                .map(|c| c.distance_m(p.coord))
                .fold(f64::INFINITY, f64::min);
            let e = net.incident_edges(a.node).next().unwrap();
            let other = net.opposite(e, a.node);
            assert!((existing[other.index()].distance_m(p.coord) - best).abs() < 1e-9);
        }
    }

    #[test]
    fn batch_points_do_not_connect_to_each_other() {
        let mut b = super::helpers::line_builder();
        let points = vec![
            Point::new("a", Coord::new(5_000.0, 0.0)),
            Point::new("b", Coord::new(5_001.0, 0.0)),
        ];
        let out = attach(&mut b, &points, &params(2)).unwrap();
        let net = b.build();
        for a in &out {
            for e in net.incident_edges(a.node) {
                assert!(net.opposite(e, a.node).index() < 5);
            }
            assert_eq!(net.degree(a.node), 2);
        }
    }

    #[test]
    fn pre_attached_points_pass_through() {
        let mut b = super::helpers::line_builder();
        let points = vec![Point::new("p", Coord::new(0.0, 0.0)).with_node(NodeId(3))];
        let out = attach(&mut b, &points, &params(1)).unwrap();
        assert_eq!(out[0].node, NodeId(3));
        assert_eq!(b.node_count(), 5);

        let bad = vec![Point::new("q", Coord::new(0.0, 0.0)).with_node(NodeId(77))];
        assert!(matches!(
            attach(&mut b, &bad, &params(1)),
            Err(NetworkError::NodeNotFound(NodeId(77)))
        ));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let mut b = super::helpers::line_builder();
        let p = vec![Point::new("a", Coord::new(1.0, 1.0))];
        assert!(matches!(attach(&mut b, &p, &params(0)), Err(NetworkError::InvalidK)));

        let nan = vec![Point::new("n", Coord::new(f64::NAN, 1.0))];
        assert!(matches!(attach(&mut b, &nan, &params(1)), Err(NetworkError::NonFiniteCoord { .. })));

        let mut empty = RoadNetworkBuilder::new();
        assert!(matches!(attach(&mut empty, &p, &params(1)), Err(NetworkError::EmptyNetwork)));
        assert_eq!(b.node_count(), 5);
    }
}

// ── Links ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod links {
    use ax_core::{Coord, NodeId};
    use crate::{Link, merge_links};

    #[test]
    fn ferry_joins_islands() {
        let mut b = super::helpers::two_triangles();
        let ferry = Link {
            from:     Coord::new(52.0, 1.0),
            to:       Coord::new(9_999.0, 2.0),
            length_m: 9_950.0,
            time_min: 40.0,
        };
        assert_eq!(merge_links(&mut b, &[ferry]).unwrap(), 1);
        let net = b.build();
        assert_eq!(net.component_summary().count, 1);
        let e = net.incident_edges(NodeId(1)).last().unwrap();
        assert_eq!(net.opposite(e, NodeId(1)), NodeId(3));
        assert_eq!(net.edge_time_min[e.index()], 40.0);
    }

    #[test]
    fn degenerate_link_skipped() {
        let mut b = super::helpers::line_builder();
        let link = Link {
            from:     Coord::new(1.0, 0.0),
            to:       Coord::new(2.0, 1.0),
            length_m: 1.0,
            time_min: 1.0,
        };
        assert_eq!(merge_links(&mut b, &[link]).unwrap(), 0);
        assert_eq!(b.edge_count(), 4);
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use ax_core::NodeId;
    use crate::NetworkError;
    use crate::loader::{read_links, read_network, read_points};

    const NODES: &str = "node_id,easting,northing\n1,100.0,0.0\n0,0.0,0.0\n2,200.0,0.0\n";
    const EDGES: &str = "source,target,length,time_weighted\n0,1,100.0,0.5\n1,2,100.0,0.5\n";

    #[test]
    fn network_rows_in_any_order() {
        let b = read_network(Cursor::new(NODES), Cursor::new(EDGES)).unwrap();
        assert_eq!(b.node_count(), 3);
        assert_eq!(b.edge_count(), 2);
        assert_eq!(b.node_pos(NodeId(1)).easting, 100.0);
    }

    #[test]
    fn gap_in_node_ids_rejected() {
        let nodes = "node_id,easting,northing\n0,0,0\n2,1,1\n";
        let err = read_network(Cursor::new(nodes), Cursor::new("source,target,length,time_weighted\n"))
            .unwrap_err();
        assert!(matches!(err, NetworkError::NonDenseNodeIds { expected: 1, found: 2 }));
    }

    #[test]
    fn dangling_edge_rejected() {
        let edges = "source,target,length,time_weighted\n0,5,1.0,1.0\n";
        let err = read_network(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(err, NetworkError::EdgeEndpointMissing { .. }));
    }

    #[test]
    fn points_with_optional_node() {
        let csv = "id,easting,northing,node_id\nA,1.5,2.5,\nB,3.0,4.0,7\n";
        let pts = read_points(Cursor::new(csv)).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].node, None);
        assert_eq!(pts[1].node, Some(NodeId(7)));

        let no_column = "id,easting,northing\nC,0,0\n";
        assert_eq!(read_points(Cursor::new(no_column)).unwrap()[0].node, None);
    }

    #[test]
    fn links_parsed() {
        let csv = "from_easting,from_northing,to_easting,to_northing,length,time_weighted\n0,0,10,0,12.5,3.0\n";
        let links = read_links(Cursor::new(csv)).unwrap();
        assert_eq!(links[0].to.easting, 10.0);
        assert_eq!(links[0].time_min, 3.0);
    }

    #[test]
    fn malformed_number_is_csv_error() {
        let nodes = "node_id,easting,northing\n0,abc,0\n";
        let err = read_network(Cursor::new(nodes), Cursor::new(EDGES)).unwrap_err();
        assert!(matches!(err, NetworkError::Csv(_)));
    }
}
