//! Reachability estimator.
//!
//! Before any exact routing, pair sources with targets by Euclidean k-NN to
//! obtain, per source, a starting search half-width (`buffer`) and the target
//! nodes the routed subgraph must contain (`required_targets`).  Euclidean
//! distance never exceeds network distance, so the buffer is only a starting
//! point; the router verifies and grows it.
//!
//! # Modes
//!
//! | Mode                              | Pairing                                          |
//! |-----------------------------------|--------------------------------------------------|
//! | [`EstimateMode::SourceNearest`]   | each source takes its `k` nearest targets        |
//! | [`EstimateMode::TargetClaims`]    | each target claims its `k` nearest sources       |
//!
//! In both modes the buffer is the largest pairing distance, rounded up to a
//! whole metre (minimum 1).  A source left without any pairing gets
//! `min_buffer` and no required targets.

use log::{debug, info};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use rustc_hash::FxHashSet;

use ax_core::{AttachedPoint, EngineConfig, EstimateMode, NodeId};

use crate::RouteResult;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// One source ready for routing.
#[derive(Clone, Debug, PartialEq)]
pub struct SourcePlan {
    pub point:            AttachedPoint,
    /// Starting search half-width in metres; always positive.
    pub buffer:           f64,
    /// Target nodes that must share a component with the source before the
    /// subgraph counts as sufficient.  Sorted, no duplicates.
    pub required_targets: Vec<NodeId>,
}

impl SourcePlan {
    /// A plan with no pairing information.
    pub fn unpaired(point: AttachedPoint, buffer: f64) -> Self {
        Self { point, buffer, required_targets: Vec::new() }
    }
}

/// Keep the first source for every distinct node; later duplicates would be
/// routed to identical results.
pub fn dedup_sources(sources: Vec<AttachedPoint>) -> Vec<AttachedPoint> {
    let before = sources.len();
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let kept: Vec<AttachedPoint> = sources.into_iter().filter(|s| seen.insert(s.node)).collect();
    if kept.len() < before {
        debug!("dropped {} sources sharing a node with an earlier source", before - kept.len());
    }
    kept
}

/// Compute one [`SourcePlan`] per source (fewer if
/// `config.drop_unclaimed_sources` removes unclaimed ones).  Output order
/// follows `sources`.
pub fn estimate_reach(
    sources: &[AttachedPoint],
    targets: &[AttachedPoint],
    config:  &EngineConfig,
) -> RouteResult<Vec<SourcePlan>> {
    config.validate()?;

    let k = config.estimate_k;
    let mut required: Vec<Vec<NodeId>> = vec![Vec::new(); sources.len()];
    let mut reach:    Vec<Option<f64>> = vec![None; sources.len()];

    match config.estimate_mode {
        EstimateMode::SourceNearest => {
            let tree = index(targets);
            for (i, source) in sources.iter().enumerate() {
                for (t, d2) in tree
                    .nearest_neighbor_iter_with_distance_2(&source.coord.to_array())
                    .take(k)
                {
                    required[i].push(targets[t.data].node);
                    reach[i] = Some(reach[i].map_or(d2, |r: f64| r.max(d2)));
                }
            }
        }
        EstimateMode::TargetClaims => {
            let tree = index(sources);
            for target in targets {
                for (s, d2) in tree
                    .nearest_neighbor_iter_with_distance_2(&target.coord.to_array())
                    .take(k)
                {
                    required[s.data].push(target.node);
                    reach[s.data] = Some(reach[s.data].map_or(d2, |r: f64| r.max(d2)));
                }
            }
        }
    }

    let mut plans = Vec::with_capacity(sources.len());
    let mut unclaimed = 0usize;
    for ((source, mut nodes), reach) in sources.iter().zip(required).zip(reach) {
        match reach {
            Some(d2) => {
                nodes.sort_unstable();
                nodes.dedup();
                plans.push(SourcePlan {
                    point:            source.clone(),
                    buffer:           d2.sqrt().ceil().max(1.0),
                    required_targets: nodes,
                });
            }
            None => {
                unclaimed += 1;
                if !config.drop_unclaimed_sources {
                    plans.push(SourcePlan::unpaired(source.clone(), config.min_buffer));
                }
            }
        }
    }

    info!(
        "estimated reach for {} sources against {} targets ({:?}, k = {k}); {unclaimed} unpaired{}",
        sources.len(),
        targets.len(),
        config.estimate_mode,
        if config.drop_unclaimed_sources && unclaimed > 0 { ", dropped" } else { "" },
    );
    Ok(plans)
}

fn index(points: &[AttachedPoint]) -> RTree<IndexedPoint> {
    RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new(p.coord.to_array(), i))
            .collect(),
    )
}
