//! Compressed adjacency backend

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{EdgeWeight, MinCutGraph, Neighbor, NodeId};
use crate::error::{MinCutError, Result};

/// Immutable graph in compressed sparse row layout
///
/// The adjacency of vertex `v` is `adjacency[offsets[v]..offsets[v + 1]]`,
/// sorted by target. Only the per-vertex labels can change after
/// construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGraph {
    offsets: Vec<usize>,
    adjacency: Vec<Neighbor>,
    in_cut: Vec<bool>,
    partition: Vec<NodeId>,
}

impl StaticGraph {
    /// Graph with `n` vertices and no edges
    pub fn empty(n: usize) -> Self {
        Self {
            offsets: vec![0; n + 1],
            adjacency: Vec::new(),
            in_cut: vec![false; n],
            partition: (0..n as NodeId).collect(),
        }
    }
}

impl MinCutGraph for StaticGraph {
    fn n(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn m(&self) -> usize {
        self.adjacency.len() / 2
    }

    fn neighbors(&self, v: NodeId) -> &[Neighbor] {
        let v = v as usize;
        &self.adjacency[self.offsets[v]..self.offsets[v + 1]]
    }

    fn from_parts(n: usize, degrees: &[usize], edges: Vec<(NodeId, NodeId, EdgeWeight)>) -> Self {
        debug_assert_eq!(degrees.len(), n);
        debug_assert_eq!(degrees.iter().sum::<usize>(), 2 * edges.len());

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for &d in degrees {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        let slots = 2 * edges.len();
        let cursors: Vec<AtomicUsize> = offsets[..n].iter().map(|&o| AtomicUsize::new(o)).collect();
        let targets: Vec<AtomicU32> = (0..slots).map(|_| AtomicU32::new(0)).collect();
        let weights: Vec<AtomicU64> = (0..slots).map(|_| AtomicU64::new(0)).collect();

        edges.par_iter().for_each(|&(u, v, w)| {
            let pu = cursors[u as usize].fetch_add(1, Ordering::Relaxed);
            targets[pu].store(v, Ordering::Relaxed);
            weights[pu].store(w, Ordering::Relaxed);

            let pv = cursors[v as usize].fetch_add(1, Ordering::Relaxed);
            targets[pv].store(u, Ordering::Relaxed);
            weights[pv].store(w, Ordering::Relaxed);
        });

        let mut adjacency: Vec<Neighbor> = targets
            .into_iter()
            .zip(weights)
            .map(|(t, w)| Neighbor::new(t.into_inner(), w.into_inner()))
            .collect();

        // slot order depends on scheduling, sort for reproducible scans
        let mut rest = adjacency.as_mut_slice();
        let mut blocks = Vec::with_capacity(n);
        for &d in degrees {
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(d);
            blocks.push(block);
            rest = tail;
        }
        blocks
            .into_par_iter()
            .for_each(|block| block.sort_unstable_by_key(|e| (e.target, e.weight)));

        Self {
            offsets,
            adjacency,
            in_cut: vec![false; n],
            partition: (0..n as NodeId).collect(),
        }
    }

    fn insert_edge(&mut self, _u: NodeId, _v: NodeId, _weight: EdgeWeight) -> Result<()> {
        Err(MinCutError::UnsupportedOperation("insert_edge on StaticGraph"))
    }

    fn delete_edge(&mut self, _u: NodeId, _v: NodeId) -> Result<EdgeWeight> {
        Err(MinCutError::UnsupportedOperation("delete_edge on StaticGraph"))
    }

    fn node_in_cut(&self, v: NodeId) -> bool {
        self.in_cut[v as usize]
    }

    fn set_node_in_cut(&mut self, v: NodeId, in_cut: bool) {
        self.in_cut[v as usize] = in_cut;
    }

    fn partition_index(&self, v: NodeId) -> NodeId {
        self.partition[v as usize]
    }

    fn set_partition_index(&mut self, v: NodeId, index: NodeId) {
        self.partition[v as usize] = index;
    }
}

/// Incremental construction of a [`StaticGraph`]
///
/// ```
/// use ruvector_mincut_exact::prelude::*;
///
/// let mut builder = GraphBuilder::start_construction(3);
/// builder.add_edge(0, 1, 2).unwrap();
/// builder.add_edge(1, 2, 1).unwrap();
/// builder.add_edge(1, 0, 3).unwrap();
/// let graph = builder.finish_construction();
///
/// assert_eq!(graph.m(), 2);
/// assert_eq!(graph.edge_weight(0, 1), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    n: usize,
    edges: Vec<(NodeId, NodeId, EdgeWeight)>,
}

impl GraphBuilder {
    /// Begin building a graph with `n` vertices
    pub fn start_construction(n: usize) -> Self {
        Self {
            n,
            edges: Vec::new(),
        }
    }

    /// Add one undirected edge. Self-loops are dropped.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) -> Result<()> {
        for x in [u, v] {
            if x as usize >= self.n {
                return Err(MinCutError::InvalidVertex(u64::from(x)));
            }
        }
        if weight == 0 {
            return Err(MinCutError::InvalidEdge(u64::from(u), u64::from(v)));
        }
        if u != v {
            self.edges.push((u.min(v), u.max(v), weight));
        }
        Ok(())
    }

    /// Add a new isolated vertex
    pub fn new_node(&mut self) -> NodeId {
        self.n += 1;
        (self.n - 1) as NodeId
    }

    /// Number of edges added so far
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Merge parallel edges and freeze the graph
    pub fn finish_construction(mut self) -> StaticGraph {
        self.edges.par_sort_unstable_by_key(|&(u, v, _)| (u, v));

        let mut merged: Vec<(NodeId, NodeId, EdgeWeight)> = Vec::with_capacity(self.edges.len());
        for (u, v, w) in self.edges {
            match merged.last_mut() {
                Some(last) if last.0 == u && last.1 == v => last.2 += w,
                _ => merged.push((u, v, w)),
            }
        }

        StaticGraph::from_edge_list(self.n, merged)
    }
}
