//! Concurrent union-find forest
//!
//! Parent pointers are atomics. `find` performs path halving with
//! compare-and-swap, `union` links the root with the lower id below the root
//! with the higher id. Links always point to a strictly larger id, so the
//! forest stays acyclic no matter how unions from different workers
//! interleave, and no lock is needed.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::graph::{NodeId, UNDEFINED_NODE};

/// Disjoint-set forest over `0..n`
#[derive(Debug)]
pub struct UnionFind {
    parents: Vec<AtomicU32>,
    roots: AtomicUsize,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parents: (0..n as NodeId).map(AtomicU32::new).collect(),
            roots: AtomicUsize::new(n),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the forest has no elements
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Current number of distinct sets
    pub fn size(&self) -> usize {
        self.roots.load(Ordering::Acquire)
    }

    /// Representative of the set containing `x`
    pub fn find(&self, x: NodeId) -> NodeId {
        let mut current = x;
        loop {
            let parent = self.parents[current as usize].load(Ordering::Acquire);
            if parent == current {
                return current;
            }
            let grandparent = self.parents[parent as usize].load(Ordering::Acquire);
            if grandparent != parent {
                // halving; a lost race just leaves the longer path in place
                let _ = self.parents[current as usize].compare_exchange(
                    parent,
                    grandparent,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                );
            }
            current = parent;
        }
    }

    /// Merge the sets of `x` and `y`.
    ///
    /// Returns `true` if two distinct sets were merged.
    pub fn union(&self, x: NodeId, y: NodeId) -> bool {
        loop {
            let rx = self.find(x);
            let ry = self.find(y);
            if rx == ry {
                return false;
            }
            let (child, parent) = if rx < ry { (rx, ry) } else { (ry, rx) };
            if self.parents[child as usize]
                .compare_exchange(child, parent, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.roots.fetch_sub(1, Ordering::AcqRel);
                return true;
            }
        }
    }

    /// Whether `x` and `y` are in the same set
    pub fn same_set(&self, x: NodeId, y: NodeId) -> bool {
        loop {
            let rx = self.find(x);
            let ry = self.find(y);
            if rx == ry {
                return true;
            }
            // rx still a root means the answer was stable
            if self.parents[rx as usize].load(Ordering::Acquire) == rx {
                return false;
            }
        }
    }

    /// Dense set ids in order of first appearance, plus the member lists.
    ///
    /// `mapping[v]` is the cluster of `v`, `reverse[c]` lists the members of
    /// cluster `c` in increasing order.
    pub fn into_mapping(self) -> (Vec<NodeId>, Vec<Vec<NodeId>>) {
        let n = self.parents.len();
        let mut root_to_cluster = vec![UNDEFINED_NODE; n];
        let mut mapping = Vec::with_capacity(n);
        let mut reverse: Vec<Vec<NodeId>> = Vec::with_capacity(self.size());

        for v in 0..n as NodeId {
            let root = self.find(v) as usize;
            if root_to_cluster[root] == UNDEFINED_NODE {
                root_to_cluster[root] = reverse.len() as NodeId;
                reverse.push(Vec::new());
            }
            let cluster = root_to_cluster[root];
            mapping.push(cluster);
            reverse[cluster as usize].push(v);
        }

        (mapping, reverse)
    }
}
