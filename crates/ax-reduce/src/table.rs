//! Minimum-distance reduction.

use rustc_hash::FxHashMap;

use ax_core::{DistanceRecord, NodeId};

/// Best distance seen so far for each target node.
///
/// Entries only ever decrease.  Merging is commutative, associative and
/// idempotent, so the table does not depend on source order and replaying a
/// record twice is harmless.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    best: FxHashMap<NodeId, f64>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `distance` for `target`.  Returns `true` if it improved the
    /// entry (or created it).
    #[inline]
    pub fn offer(&mut self, target: NodeId, distance: f64) -> bool {
        match self.best.get_mut(&target) {
            Some(current) if *current <= distance => false,
            Some(current) => {
                *current = distance;
                true
            }
            None => {
                self.best.insert(target, distance);
                true
            }
        }
    }

    /// Fold one source's records in.  Returns how many entries improved.
    pub fn merge_records(&mut self, records: &[DistanceRecord]) -> usize {
        records.iter().filter(|r| self.offer(r.target, r.distance)).count()
    }

    /// Fold another table in (used to combine shards).
    pub fn merge_table(&mut self, other: &ResultTable) {
        for (&target, &distance) in &other.best {
            self.offer(target, distance);
        }
    }

    pub fn get(&self, target: NodeId) -> Option<f64> {
        self.best.get(&target).copied()
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.best.iter().map(|(&n, &d)| (n, d))
    }

    /// Entries ascending by node id.
    pub fn to_sorted_vec(&self) -> Vec<(NodeId, f64)> {
        let mut out: Vec<(NodeId, f64)> = self.iter().collect();
        out.sort_unstable_by_key(|&(n, _)| n);
        out
    }
}
