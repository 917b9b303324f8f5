//! Unit tests for ax-batch.

#[cfg(test)]
mod helpers {
    use ax_core::{Coord, EngineConfig, NodeId, Point, Weight};
    use ax_network::{Edge, RoadNetworkBuilder};

    /// `side × side` grid, 100 m spacing, 1 minute per edge.
    pub fn grid(side: u32) -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        for y in 0..side {
            for x in 0..side {
                b.add_node(Coord::new(x as f64 * 100.0, y as f64 * 100.0));
            }
        }
        for y in 0..side {
            for x in 0..side {
                let n = y * side + x;
                if x + 1 < side {
                    b.add_edge(Edge::new(NodeId(n), NodeId(n + 1), 100.0, 1.0)).unwrap();
                }
                if y + 1 < side {
                    b.add_edge(Edge::new(NodeId(n), NodeId(n + side), 100.0, 1.0)).unwrap();
                }
            }
        }
        b
    }

    pub fn points(prefix: &str, coords: &[(f64, f64)]) -> Vec<Point> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(format!("{prefix}{i}"), Coord::new(x, y)))
            .collect()
    }

    pub fn grid_targets() -> Vec<Point> {
        points("t", &[(10.0, 5.0), (240.0, 90.0), (420.0, 410.0), (90.0, 330.0), (505.0, 20.0), (300.0, 300.0)])
    }

    pub fn grid_sources() -> Vec<Point> {
        points("s", &[(0.0, 0.0), (510.0, 510.0), (250.0, 260.0), (120.0, 480.0), (470.0, 130.0)])
    }

    pub fn small_config() -> EngineConfig {
        EngineConfig {
            min_buffer: 150.0,
            max_buffer: 5_000.0,
            estimate_k: 2,
            weight:     Weight::Length,
            ..EngineConfig::default()
        }
    }
}

// ── Resume ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resume {
    use tempfile::TempDir;

    use ax_reduce::{CsvWriter, export_table};

    use crate::{BatchError, BatchRunner, NoopObserver, Pipeline};

    use super::helpers::{grid, grid_sources, grid_targets, small_config};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn stop_and_resume_at_any_position_matches_uninterrupted() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let n = prepared.plans.len();
        assert_eq!(n, 5);

        let dir = tmp();
        let full = BatchRunner::new(&router, dir.path())
            .run("clinics", &prepared.plans, &mut NoopObserver)
            .unwrap();
        assert_eq!(full.report.routed, n);
        assert!(!full.table.is_empty());

        for stop in 0..=n {
            let dir = tmp();
            let runner = BatchRunner::new(&router, dir.path());
            runner.run_until("clinics", &prepared.plans, stop, &mut NoopObserver).unwrap();
            assert!(runner.log_path("clinics").exists());

            let resumed = runner.run("clinics", &prepared.plans, &mut NoopObserver).unwrap();
            assert_eq!(resumed.table, full.table, "stop at {stop}");
            assert_eq!(resumed.report.skipped, stop.saturating_sub(1));
            assert!(runner.log_path("clinics").exists());
            resumed.finish().unwrap();
            assert!(!runner.log_path("clinics").exists());
        }
    }

    #[test]
    fn resume_after_third_source_reroutes_it() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let dir = tmp();
        let runner = BatchRunner::new(&router, dir.path());

        let partial = runner.run_until("shops", &prepared.plans, 3, &mut NoopObserver).unwrap();
        assert_eq!(partial.report.routed, 3);

        let done = runner.run("shops", &prepared.plans, &mut NoopObserver).unwrap();
        assert_eq!(done.report.skipped, 2);
        assert_eq!(done.report.routed, 3);
    }

    #[test]
    fn failed_export_keeps_log_for_rerun() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let n = prepared.plans.len();
        let dir = tmp();
        let runner = BatchRunner::new(&router, dir.path());

        let first = runner.run("dentists", &prepared.plans, &mut NoopObserver).unwrap();
        assert_eq!(first.report.routed, n);
        let out = dir.path().join("missing").join("dentists.csv");
        assert!(CsvWriter::new(&out).is_err());
        let expected = first.table.clone();
        drop(first);
        assert!(runner.log_path("dentists").exists());

        let rerun = runner.run("dentists", &prepared.plans, &mut NoopObserver).unwrap();
        assert_eq!(rerun.report.skipped, n - 1);
        assert_eq!(rerun.report.routed, 1);
        assert_eq!(rerun.table, expected);

        let path = dir.path().join("dentists.csv");
        let mut writer = CsvWriter::new(&path).unwrap();
        let rows = export_table(&rerun.table, pipeline.targets(), &mut writer).unwrap();
        assert_eq!(rows, rerun.table.len());
        assert_eq!(rerun.log_paths().count(), 1);
        rerun.finish().unwrap();
        assert!(!runner.log_path("dentists").exists());
        assert!(path.exists());
    }

    #[test]
    fn longer_log_than_source_list_is_rejected() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let dir = tmp();
        let runner = BatchRunner::new(&router, dir.path());

        runner.run_until("pubs", &prepared.plans, 5, &mut NoopObserver).unwrap();
        let err = runner.run("pubs", &prepared.plans[..3], &mut NoopObserver).unwrap_err();
        assert!(matches!(err, BatchError::ResumeMismatch { logged: 5, sources: 3 }));
        assert!(runner.log_path("pubs").exists());
    }

    #[test]
    fn torn_tail_reported() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let dir = tmp();
        let runner = BatchRunner::new(&router, dir.path());

        runner.run_until("gp", &prepared.plans, 2, &mut NoopObserver).unwrap();
        let path = runner.log_path("gp");
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("3,4");
        std::fs::write(&path, text).unwrap();

        let done = runner.run("gp", &prepared.plans, &mut NoopObserver).unwrap();
        assert!(done.report.torn_tail);
        assert_eq!(done.report.skipped, 1);
        assert_eq!(done.report.routed, 4);
    }
}

// ── Reduction ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reduction {
    use tempfile::TempDir;

    use ax_core::{Coord, NodeId, Point};
    use ax_network::{Edge, RoadNetworkBuilder};

    use crate::{BatchObserver, BatchReport, BatchRunner, NoopObserver, Pipeline};
    use ax_route::SourceOutcome;

    use super::helpers::small_config;

    /// Target node 0 with sources 12.0 m (node 1) and 7.5 m (node 2) away.
    fn star() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(Coord::new(0.0, 0.0));
        b.add_node(Coord::new(12.0, 0.0));
        b.add_node(Coord::new(0.0, 7.5));
        b.add_edge(Edge::new(NodeId(0), NodeId(1), 12.0, 1.0)).unwrap();
        b.add_edge(Edge::new(NodeId(0), NodeId(2), 7.5, 1.0)).unwrap();
        b
    }

    fn pre(id: &str, node: u32, x: f64, y: f64) -> Point {
        Point::new(id, Coord::new(x, y)).with_node(NodeId(node))
    }

    #[derive(Default)]
    struct Counting {
        started: usize,
        done:    usize,
        ended:   Option<BatchReport>,
    }

    impl BatchObserver for Counting {
        fn on_batch_start(&mut self, _category: &str, _total: usize) {
            self.started += 1;
        }
        fn on_source_done(&mut self, _outcome: &SourceOutcome) {
            self.done += 1;
        }
        fn on_batch_end(&mut self, _category: &str, report: &BatchReport) {
            self.ended = Some(report.clone());
        }
    }

    #[test]
    fn minimum_independent_of_source_order() {
        let targets = [pre("T", 0, 0.0, 0.0)];
        let pipeline = Pipeline::new(small_config(), star(), &targets).unwrap();

        let a = pre("A", 1, 12.0, 0.0);
        let b = pre("B", 2, 0.0, 7.5);
        for order in [vec![a.clone(), b.clone()], vec![b, a]] {
            let prepared = pipeline.prepare(&order).unwrap();
            let router = pipeline.router(&prepared).unwrap();
            let dir = TempDir::new().unwrap();
            let out = BatchRunner::new(&router, dir.path())
                .run("cat", &prepared.plans, &mut NoopObserver)
                .unwrap();
            assert_eq!(out.table.get(NodeId(0)), Some(7.5));
            assert_eq!(out.table.len(), 1);
        }
    }

    #[test]
    fn observer_sees_every_source() {
        let targets = [pre("T", 0, 0.0, 0.0)];
        let pipeline = Pipeline::new(small_config(), star(), &targets).unwrap();
        let prepared = pipeline.prepare(&[pre("A", 1, 12.0, 0.0), pre("B", 2, 0.0, 7.5)]).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let dir = TempDir::new().unwrap();

        let mut obs = Counting::default();
        let out = BatchRunner::new(&router, dir.path()).run("cat", &prepared.plans, &mut obs).unwrap();
        assert_eq!(obs.started, 1);
        assert_eq!(obs.done, 2);
        assert_eq!(obs.ended, Some(out.report));
    }

    #[test]
    fn duplicate_source_nodes_routed_once() {
        let targets = [pre("T", 0, 0.0, 0.0)];
        let pipeline = Pipeline::new(small_config(), star(), &targets).unwrap();
        let prepared = pipeline
            .prepare(&[pre("A", 1, 12.0, 0.0), pre("A2", 1, 12.0, 0.0), pre("B", 2, 0.0, 7.5)])
            .unwrap();
        assert_eq!(prepared.plans.len(), 2);
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use tempfile::TempDir;

    use ax_core::{Coord, EngineConfig, NodeId, Point};
    use ax_network::{Edge, RoadNetworkBuilder};

    use crate::{BatchError, NoopObserver, Pipeline};

    use super::helpers::{grid, grid_sources, grid_targets, points, small_config};

    fn two_triangles() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        for base in [0.0, 10_000.0] {
            b.add_node(Coord::new(base, 0.0));
            b.add_node(Coord::new(base + 50.0, 0.0));
            b.add_node(Coord::new(base, 50.0));
        }
        for base in [0u32, 3] {
            b.add_edge(Edge::new(NodeId(base), NodeId(base + 1), 50.0, 1.0)).unwrap();
            b.add_edge(Edge::new(NodeId(base + 1), NodeId(base + 2), 70.0, 1.4)).unwrap();
            b.add_edge(Edge::new(NodeId(base + 2), NodeId(base), 50.0, 1.0)).unwrap();
        }
        b
    }

    #[test]
    fn categories_do_not_share_source_nodes() {
        let pipeline = Pipeline::new(small_config(), grid(4), &grid_targets()).unwrap();
        let base_nodes = 16 + grid_targets().len();
        let a = pipeline.prepare(&grid_sources()).unwrap();
        let b = pipeline.prepare(&grid_sources()[..2]).unwrap();
        assert_eq!(a.network.node_count(), base_nodes + 5);
        assert_eq!(b.network.node_count(), base_nodes + 2);
        assert_eq!(pipeline.targets()[0].node, NodeId(16));
    }

    #[test]
    fn other_island_never_reported() {
        let targets = points("t", &[(10.0, 10.0), (40.0, 5.0), (10_010.0, 10.0), (10_040.0, 5.0)]);
        let config = EngineConfig { max_buffer: 20_000.0, ..small_config() };
        let pipeline = Pipeline::new(config, two_triangles(), &targets).unwrap();
        let island_b: Vec<NodeId> = pipeline.targets()[2..].iter().map(|t| t.node).collect();

        let dir = TempDir::new().unwrap();
        let out = pipeline
            .run_category("hazards", &[Point::new("s", Coord::new(5.0, 45.0))], dir.path(), 1, &mut NoopObserver)
            .unwrap();
        assert_eq!(out.report.best_effort, 1);
        assert_eq!(out.table.len(), 2);
        for node in island_b {
            assert!(out.table.get(node).is_none());
        }
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let config = EngineConfig { attach_k: 0, ..EngineConfig::default() };
        assert!(matches!(
            Pipeline::new(config, grid(2), &[]),
            Err(BatchError::Config(_))
        ));
    }
}

// ── Sharded execution ─────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod sharded {
    use tempfile::TempDir;

    use crate::{BatchError, BatchRunner, NoopObserver, Pipeline};

    use super::helpers::{grid, grid_sources, grid_targets, small_config};

    #[test]
    fn sharded_table_matches_sequential() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();

        let dir = TempDir::new().unwrap();
        let runner = BatchRunner::new(&router, dir.path());
        let seq = runner.run("c", &prepared.plans, &mut NoopObserver).unwrap();
        let seq_table = seq.table.clone();
        seq.finish().unwrap();
        for shards in [2, 3, 8] {
            let par = runner.run_sharded("c", &prepared.plans, shards, &mut NoopObserver).unwrap();
            assert_eq!(par.table, seq_table, "{shards} shards");
            assert_eq!(par.report.routed, prepared.plans.len());
            assert!(par.log_paths().all(|p| p.exists()));
            par.finish().unwrap();
            for i in 0..shards {
                assert!(!runner.shard_log_path("c", i).exists());
            }
        }
    }

    #[test]
    fn foreign_shard_log_rejected() {
        let pipeline = Pipeline::new(small_config(), grid(6), &grid_targets()).unwrap();
        let prepared = pipeline.prepare(&grid_sources()).unwrap();
        let router = pipeline.router(&prepared).unwrap();
        let dir = TempDir::new().unwrap();
        let runner = BatchRunner::new(&router, dir.path());

        // Shard 1 of 2 starts at batch 4; a log starting at batch 1 belongs
        // to a different layout.
        std::fs::write(runner.shard_log_path("c", 1), "batch_index,target_node,distance\n1,,\n").unwrap();
        let err = runner.run_sharded("c", &prepared.plans, 2, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, BatchError::ShardMismatch { logged_first: 1, expected_first: 4, .. }));
    }
}
