//! Graph representation for exact and dynamic minimum cut
//!
//! All algorithms are written once against the [`MinCutGraph`] capability
//! trait and instantiated per backend:
//!
//! - [`StaticGraph`]: compressed adjacency arrays, built once through
//!   [`GraphBuilder`]; edge mutation is unsupported
//! - [`MutableGraph`]: adjacency lists with edge insertion/deletion,
//!   contained-vertex sets and in-place cluster contraction
//!
//! Vertices are dense identifiers `0..n`. Edge weights are strictly positive
//! integers and self-loops are never materialized.

mod csr;
mod mutable;

pub use csr::{GraphBuilder, StaticGraph};
pub use mutable::MutableGraph;

use std::collections::VecDeque;
use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Dense vertex identifier
pub type NodeId = u32;

/// Integer edge weight
pub type EdgeWeight = u64;

/// Marker for "no vertex"
pub const UNDEFINED_NODE: NodeId = NodeId::MAX;

/// One entry of a vertex's adjacency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    /// Other endpoint
    pub target: NodeId,
    /// Weight of the connecting edge
    pub weight: EdgeWeight,
}

impl Neighbor {
    /// Create a new adjacency entry
    pub fn new(target: NodeId, weight: EdgeWeight) -> Self {
        Self { target, weight }
    }
}

/// Statistics about the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of vertices in the graph
    pub num_vertices: usize,
    /// Number of undirected edges in the graph
    pub num_edges: usize,
    /// Sum of all edge weights
    pub total_weight: EdgeWeight,
    /// Minimum weighted degree
    pub min_degree: EdgeWeight,
    /// Maximum weighted degree
    pub max_degree: EdgeWeight,
}

/// Capability set shared by every graph backend
pub trait MinCutGraph: Clone + Send + Sync + Sized {
    /// Number of vertices
    fn n(&self) -> usize;

    /// Number of undirected edges
    fn m(&self) -> usize;

    /// Adjacency of `v`
    fn neighbors(&self, v: NodeId) -> &[Neighbor];

    /// Build a graph from aggregated undirected edges.
    ///
    /// Every edge appears once; `degrees[v]` is the number of edges incident
    /// to `v`. Contraction calls this with pre-counted degrees.
    fn from_parts(n: usize, degrees: &[usize], edges: Vec<(NodeId, NodeId, EdgeWeight)>) -> Self;

    /// Insert an undirected edge
    fn insert_edge(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) -> Result<()>;

    /// Delete one undirected edge between `u` and `v`, returning its weight
    fn delete_edge(&mut self, u: NodeId, v: NodeId) -> Result<EdgeWeight>;

    /// Cut side label of `v`
    fn node_in_cut(&self, v: NodeId) -> bool;

    /// Set the cut side label of `v`
    fn set_node_in_cut(&mut self, v: NodeId, in_cut: bool);

    /// Partition index of `v` (cluster id after the last contraction)
    fn partition_index(&self, v: NodeId) -> NodeId;

    /// Set the partition index of `v`
    fn set_partition_index(&mut self, v: NodeId, index: NodeId);

    /// Iterate over vertex ids
    fn nodes(&self) -> Range<NodeId> {
        0..self.n() as NodeId
    }

    /// Build from an edge list, counting degrees first
    fn from_edge_list(n: usize, edges: Vec<(NodeId, NodeId, EdgeWeight)>) -> Self {
        let mut degrees = vec![0usize; n];
        for &(u, v, _) in &edges {
            degrees[u as usize] += 1;
            degrees[v as usize] += 1;
        }
        Self::from_parts(n, &degrees, edges)
    }

    /// Convert from another backend
    fn from_graph<H: MinCutGraph>(other: &H) -> Self {
        Self::from_edge_list(other.n(), other.edge_list())
    }

    /// Sum of incident edge weights
    fn weighted_degree(&self, v: NodeId) -> EdgeWeight {
        self.neighbors(v).iter().map(|e| e.weight).sum()
    }

    /// Number of incident adjacency entries
    fn unweighted_degree(&self, v: NodeId) -> usize {
        self.neighbors(v).len()
    }

    /// Vertex with minimum weighted degree (lowest id on ties)
    fn min_degree(&self) -> Option<(NodeId, EdgeWeight)> {
        self.nodes()
            .into_par_iter()
            .map(|v| (self.weighted_degree(v), v))
            .min()
            .map(|(degree, v)| (v, degree))
    }

    /// Sum of all edge weights
    fn total_weight(&self) -> EdgeWeight {
        let twice: EdgeWeight = self
            .nodes()
            .into_par_iter()
            .map(|v| self.weighted_degree(v))
            .sum();
        twice / 2
    }

    /// Total weight between `u` and `v` (parallel edges summed)
    fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<EdgeWeight> {
        if u as usize >= self.n() {
            return None;
        }
        let weight: EdgeWeight = self
            .neighbors(u)
            .iter()
            .filter(|e| e.target == v)
            .map(|e| e.weight)
            .sum();
        (weight > 0).then_some(weight)
    }

    /// Check if an edge exists
    fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_weight(u, v).is_some()
    }

    /// Every undirected edge once, as `(min, max, weight)`
    fn edge_list(&self) -> Vec<(NodeId, NodeId, EdgeWeight)> {
        let mut edges = Vec::with_capacity(self.m());
        for u in self.nodes() {
            for e in self.neighbors(u) {
                if u < e.target {
                    edges.push((u, e.target, e.weight));
                }
            }
        }
        edges
    }

    /// Weight of the edges crossing the bipartition given by `side`
    fn cut_weight(&self, side: &[bool]) -> EdgeWeight {
        self.nodes()
            .into_par_iter()
            .filter(|&u| side[u as usize])
            .map(|u| {
                self.neighbors(u)
                    .iter()
                    .filter(|e| !side[e.target as usize])
                    .map(|e| e.weight)
                    .sum::<EdgeWeight>()
            })
            .sum()
    }

    /// Get graph statistics
    fn stats(&self) -> GraphStats {
        if self.n() == 0 {
            return GraphStats::default();
        }
        let degrees: Vec<EdgeWeight> = self.nodes().map(|v| self.weighted_degree(v)).collect();
        GraphStats {
            num_vertices: self.n(),
            num_edges: self.m(),
            total_weight: degrees.iter().sum::<EdgeWeight>() / 2,
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Get connected components using BFS
pub fn connected_components<G: MinCutGraph>(graph: &G) -> Vec<Vec<NodeId>> {
    let mut visited = vec![false; graph.n()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in graph.nodes() {
        if visited[start as usize] {
            continue;
        }

        let mut component = Vec::new();
        visited[start as usize] = true;
        queue.push_back(start);

        while let Some(v) = queue.pop_front() {
            component.push(v);
            for e in graph.neighbors(v) {
                if !visited[e.target as usize] {
                    visited[e.target as usize] = true;
                    queue.push_back(e.target);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Check if graph is connected
pub fn is_connected<G: MinCutGraph>(graph: &G) -> bool {
    graph.n() <= 1 || connected_components(graph).len() == 1
}

/// Induced subgraph on `vertices`.
///
/// Returns the subgraph and the map from new ids to ids in `graph`.
pub fn extract_block<G: MinCutGraph>(graph: &G, vertices: &[NodeId]) -> (G, Vec<NodeId>) {
    let mut new_id = vec![UNDEFINED_NODE; graph.n()];
    for (i, &v) in vertices.iter().enumerate() {
        new_id[v as usize] = i as NodeId;
    }

    let mut edges = Vec::new();
    for &u in vertices {
        for e in graph.neighbors(u) {
            let t = new_id[e.target as usize];
            if t != UNDEFINED_NODE && u < e.target {
                edges.push((new_id[u as usize], t, e.weight));
            }
        }
    }

    (G::from_edge_list(vertices.len(), edges), vertices.to_vec())
}

/// Largest connected component as its own graph, with the id map back
pub fn largest_component<G: MinCutGraph>(graph: &G) -> (G, Vec<NodeId>) {
    let largest = connected_components(graph)
        .into_iter()
        .max_by_key(Vec::len)
        .unwrap_or_default();
    extract_block(graph, &largest)
}
