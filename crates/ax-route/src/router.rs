//! Adaptive subgraph router.
//!
//! Routes one source at a time over a bounded subgraph of the read-only
//! [`RoadNetwork`] instead of the whole network:
//!
//! 1. `radius = max(plan.buffer, min_buffer)`.
//! 2. Cut the subgraph of every edge touching a node inside the square of
//!    half-width `radius` around the source node, and keep only the connected
//!    component containing the source.
//! 3. If that component holds the source and every required target, the
//!    subgraph is sufficient ([`Coverage::Verified`]).
//! 4. Otherwise grow the radius (clamped to `max_buffer`) and retry; once
//!    `max_buffer` has been tried, continue with what was obtained
//!    ([`Coverage::BestEffort`]).
//! 5. Run the backend from the source and keep results for target nodes only.

use log::{debug, warn};
use rustc_hash::FxHashSet;

use ax_core::{BatchIndex, Coord, DistanceRecord, EngineConfig, NodeId};
use ax_network::{RoadNetwork, Subgraph};

use crate::backend::{DijkstraBackend, ShortestPathBackend};
use crate::estimate::SourcePlan;
use crate::{RouteError, RouteResult};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Whether a source's records are known to include all required targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Coverage {
    /// The routed component contained the source and every required target.
    Verified,
    /// Growth stopped at `max_buffer` without proving sufficiency.  Some
    /// reachable targets may be missing from the records.
    BestEffort,
}

/// Everything the router produced for one source.
#[derive(Clone, Debug)]
pub struct SourceOutcome {
    pub batch_index: BatchIndex,
    /// One record per reachable target node, ascending by node id.
    pub records:     Vec<DistanceRecord>,
    /// Half-widths tried, in order.  Non-decreasing.
    pub radii:       Vec<f64>,
    pub coverage:    Coverage,
}

impl SourceOutcome {
    pub fn is_best_effort(&self) -> bool {
        self.coverage == Coverage::BestEffort
    }
}

// ── AdaptiveRouter ────────────────────────────────────────────────────────────

/// Shares one network, target set and config across every source of a batch.
///
/// `AdaptiveRouter` is `Sync` when the backend is, so a sharded run can route
/// from several threads at once.
pub struct AdaptiveRouter<'a, B: ShortestPathBackend = DijkstraBackend> {
    network: &'a RoadNetwork,
    targets: FxHashSet<NodeId>,
    config:  &'a EngineConfig,
    backend: B,
}

impl<'a> AdaptiveRouter<'a, DijkstraBackend> {
    /// Router with the default Dijkstra backend.
    pub fn with_dijkstra(
        network: &'a RoadNetwork,
        targets: impl IntoIterator<Item = NodeId>,
        config:  &'a EngineConfig,
    ) -> RouteResult<Self> {
        Self::new(network, targets, config, DijkstraBackend)
    }
}

impl<'a, B: ShortestPathBackend> AdaptiveRouter<'a, B> {
    /// Validate `config` and every target node against `network`.
    pub fn new(
        network: &'a RoadNetwork,
        targets: impl IntoIterator<Item = NodeId>,
        config:  &'a EngineConfig,
        backend: B,
    ) -> RouteResult<Self> {
        config.validate()?;
        let targets: FxHashSet<NodeId> = targets.into_iter().collect();
        if let Some(&missing) = targets.iter().find(|n| !network.contains(**n)) {
            return Err(RouteError::TargetNodeMissing(missing));
        }
        Ok(Self { network, targets, config, backend })
    }

    pub fn network(&self) -> &RoadNetwork {
        self.network
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Route one source.
    ///
    /// # Errors
    ///
    /// Fails only on invalid input: non-finite source coordinates or a source
    /// node absent from the network.  Failing to prove sufficiency is not an
    /// error; it yields [`Coverage::BestEffort`].
    pub fn route(&self, batch_index: BatchIndex, plan: &SourcePlan) -> RouteResult<SourceOutcome> {
        let source = &plan.point;
        if !source.coord.is_finite() {
            return Err(RouteError::NonFiniteSource { id: source.id.clone() });
        }
        if !self.network.contains(source.node) {
            return Err(RouteError::SourceNodeMissing { id: source.id.clone(), node: source.node });
        }

        // Pre-attached points may sit away from their node.
        let center = self.network.node_pos[source.node.index()];
        let mut radius = self.config.initial_radius(plan.buffer);
        let mut radii = Vec::new();
        let (graph, coverage) = loop {
            radii.push(radius);
            let component = self.extract(center, source.node, radius);
            if self.is_sufficient(component.as_ref(), &plan.required_targets) {
                break (component, Coverage::Verified);
            }
            if radius >= self.config.max_buffer {
                warn!(
                    "source {batch_index} ({}): required targets not reached within {radius} m; \
                     continuing best-effort",
                    source.id
                );
                break (component, Coverage::BestEffort);
            }
            let next = self.config.next_radius(radius);
            debug!("source {batch_index}: increasing radius {radius} -> {next}");
            radius = next;
        };

        let mut records: Vec<DistanceRecord> = match graph {
            Some(graph) => self
                .backend
                .shortest_paths(&graph, source.node, self.config.cutoff)
                .into_iter()
                .filter(|(node, _)| self.targets.contains(node))
                .map(|(target, distance)| DistanceRecord { target, distance, batch_index })
                .collect(),
            None => Vec::new(),
        };
        records.sort_unstable_by_key(|r| r.target);

        Ok(SourceOutcome { batch_index, records, radii, coverage })
    }

    /// The component containing `node` of the subgraph cut at `radius`, or
    /// `None` if `node` has no edge in it.
    fn extract(&self, center: Coord, node: NodeId, radius: f64) -> Option<Subgraph> {
        let in_box = self.network.nodes_in_box(center, radius);
        self.network
            .build_subgraph(&in_box, self.config.weight)
            .component_containing(node)
    }

    fn is_sufficient(&self, component: Option<&Subgraph>, required: &[NodeId]) -> bool {
        component.is_some_and(|c| required.iter().all(|&t| c.contains(t)))
    }
}
