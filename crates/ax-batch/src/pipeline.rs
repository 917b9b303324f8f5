//! End-to-end preparation of one category: attachment, de-duplication,
//! network build and reachability estimation.
//!
//! Targets are attached once into a base builder.  Each category clones that
//! builder, attaches its own sources and freezes the result, so categories
//! never see each other's source nodes.

use std::path::Path;

use log::info;

use ax_core::{AttachedPoint, EngineConfig, Point};
use ax_network::{AttachParams, RoadNetwork, RoadNetworkBuilder, attach};
use ax_route::{AdaptiveRouter, DijkstraBackend, SourcePlan, dedup_sources, estimate_reach};

use crate::{BatchObserver, BatchResult, BatchRunner, CategoryOutcome};

/// A base network with targets attached, shared by every category.
pub struct Pipeline {
    config:  EngineConfig,
    base:    RoadNetworkBuilder,
    targets: Vec<AttachedPoint>,
}

/// One category ready for routing.
pub struct PreparedCategory {
    pub network: RoadNetwork,
    /// One plan per distinct source node, in input order.
    pub plans:   Vec<SourcePlan>,
}

impl Pipeline {
    /// Validate `config` and attach `targets` to `network`.
    pub fn new(config: EngineConfig, mut network: RoadNetworkBuilder, targets: &[Point]) -> BatchResult<Self> {
        config.validate()?;
        let targets = attach(&mut network, targets, &AttachParams::from_config(&config))?;
        info!("attached {} targets", targets.len());
        Ok(Self { config, base: network, targets })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn targets(&self) -> &[AttachedPoint] {
        &self.targets
    }

    /// Attach `sources` to a copy of the base network and estimate reach.
    pub fn prepare(&self, sources: &[Point]) -> BatchResult<PreparedCategory> {
        let mut builder = self.base.clone();
        let attached = attach(&mut builder, sources, &AttachParams::from_config(&self.config))?;
        let attached = dedup_sources(attached);

        let network = builder.build();
        let summary = network.component_summary();
        info!(
            "network: {} nodes, {} edges, {} components (largest {} nodes, {} isolated)",
            network.node_count(),
            network.edge_count(),
            summary.count,
            summary.largest,
            summary.isolated
        );

        let plans = estimate_reach(&attached, &self.targets, &self.config)?;
        Ok(PreparedCategory { network, plans })
    }

    /// Router over a prepared category's network with this pipeline's
    /// targets and config.
    pub fn router<'a>(&'a self, prepared: &'a PreparedCategory) -> BatchResult<AdaptiveRouter<'a, DijkstraBackend>> {
        Ok(AdaptiveRouter::with_dijkstra(
            &prepared.network,
            self.targets.iter().map(|t| t.node),
            &self.config,
        )?)
    }

    /// Prepare, route and reduce one category.  `shards > 1` needs the
    /// `parallel` feature; without it the category runs sequentially.
    /// Call [`CategoryOutcome::finish`] once the table is exported.
    pub fn run_category<O: BatchObserver + Send>(
        &self,
        category: &str,
        sources:  &[Point],
        log_dir:  &Path,
        shards:   usize,
        observer: &mut O,
    ) -> BatchResult<CategoryOutcome> {
        info!("{category}: {} sources", sources.len());
        let prepared = self.prepare(sources)?;
        let router = self.router(&prepared)?;
        let runner = BatchRunner::new(&router, log_dir);

        #[cfg(feature = "parallel")]
        {
            runner.run_sharded(category, &prepared.plans, shards, observer)
        }
        #[cfg(not(feature = "parallel"))]
        {
            if shards > 1 {
                log::warn!("{category}: built without `parallel`; ignoring {shards} shards");
            }
            runner.run(category, &prepared.plans, observer)
        }
    }
}
