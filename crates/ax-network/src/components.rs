//! Connected components via union-find.
//!
//! Used in two places: per routing attempt to keep only the component that
//! contains the source, and once per run to report how fragmented the input
//! network is.

/// Disjoint-set forest with union by size and path halving.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<u32>,
    size:   Vec<u32>,
    sets:   usize,
}

impl DisjointSet {
    /// `n` singleton sets `{0}, {1}, …, {n-1}`.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size:   vec![1; n],
            sets:   n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            let grandparent = self.parent[self.parent[x] as usize];
            self.parent[x] = grandparent;
            x = grandparent as usize;
        }
        x
    }

    /// Merge the sets of `a` and `b`.  Returns `false` if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra as u32;
        self.size[ra] += self.size[rb];
        self.sets -= 1;
        true
    }

    /// Number of elements in the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let r = self.find(x);
        self.size[r] as usize
    }

    /// Number of disjoint sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Size of the largest set (0 when empty).
    pub fn largest_set(&self) -> usize {
        (0..self.len())
            .filter(|&i| self.parent[i] as usize == i)
            .map(|i| self.size[i] as usize)
            .max()
            .unwrap_or(0)
    }
}

/// Connectivity statistics for a whole network.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComponentSummary {
    /// Number of connected components (isolated nodes count individually).
    pub count:    usize,
    /// Node count of the largest component.
    pub largest:  usize,
    /// Nodes with no incident edge.
    pub isolated: usize,
}
