//! Adjacency-list backend with edge mutation and contained-vertex tracking

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EdgeWeight, MinCutGraph, Neighbor, NodeId};
use crate::error::{MinCutError, Result};

/// Mutable graph whose nodes may stand for sets of original vertices
///
/// After [`MutableGraph::contract_clusters`] every node remembers the
/// original vertices it absorbed, and every original vertex remembers the
/// node it currently lives in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutableGraph {
    adjacency: Vec<Vec<Neighbor>>,
    contained: Vec<Vec<NodeId>>,
    position: Vec<NodeId>,
    in_cut: Vec<bool>,
    partition: Vec<NodeId>,
    num_edges: usize,
}

impl MutableGraph {
    /// Graph with `n` isolated vertices
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            contained: (0..n as NodeId).map(|v| vec![v]).collect(),
            position: (0..n as NodeId).collect(),
            in_cut: vec![false; n],
            partition: (0..n as NodeId).collect(),
            num_edges: 0,
        }
    }

    /// Add an isolated node standing for a fresh original vertex
    pub fn add_node(&mut self) -> NodeId {
        let node = self.adjacency.len() as NodeId;
        let original = self.position.len() as NodeId;
        self.adjacency.push(Vec::new());
        self.contained.push(vec![original]);
        self.position.push(node);
        self.in_cut.push(false);
        self.partition.push(node);
        node
    }

    /// Original vertices represented by `v`
    pub fn contained_vertices(&self, v: NodeId) -> &[NodeId] {
        &self.contained[v as usize]
    }

    /// Node currently holding the original vertex `original`
    pub fn current_position(&self, original: NodeId) -> Option<NodeId> {
        self.position.get(original as usize).copied()
    }

    /// Number of original vertices tracked by the position map
    pub fn num_original_vertices(&self) -> usize {
        self.position.len()
    }

    /// Replace the contained-vertex sets, rebuilding the position map.
    ///
    /// The sets must be disjoint and cover `0..num_original`.
    pub fn with_contained_vertices(mut self, contained: Vec<Vec<NodeId>>) -> Self {
        debug_assert_eq!(contained.len(), self.adjacency.len());
        let num_original: usize = contained.iter().map(Vec::len).sum();
        self.position = vec![0; num_original];
        for (node, members) in contained.iter().enumerate() {
            for &v in members {
                self.position[v as usize] = node as NodeId;
            }
        }
        self.contained = contained;
        self
    }

    /// Contract in place: node `v` becomes node `mapping[v]`.
    ///
    /// Edges between clusters are summed, edges inside a cluster vanish, and
    /// contained-vertex sets are merged.
    pub fn contract_clusters(&mut self, mapping: &[NodeId], num_clusters: usize) {
        debug_assert_eq!(mapping.len(), self.adjacency.len());

        let mut aggregated: Vec<HashMap<NodeId, EdgeWeight>> = vec![HashMap::new(); num_clusters];
        let mut contained: Vec<Vec<NodeId>> = vec![Vec::new(); num_clusters];

        for (v, adjacency) in self.adjacency.iter().enumerate() {
            let cv = mapping[v];
            for e in adjacency {
                let ct = mapping[e.target as usize];
                if ct != cv {
                    *aggregated[cv as usize].entry(ct).or_insert(0) += e.weight;
                }
            }
            contained[cv as usize].append(&mut self.contained[v]);
        }

        self.num_edges = 0;
        self.adjacency = aggregated
            .into_iter()
            .map(|targets| {
                let mut list: Vec<Neighbor> = targets
                    .into_iter()
                    .map(|(t, w)| Neighbor::new(t, w))
                    .collect();
                list.sort_unstable_by_key(|e| e.target);
                self.num_edges += list.len();
                list
            })
            .collect();
        self.num_edges /= 2;

        for (node, members) in contained.iter().enumerate() {
            for &v in members {
                self.position[v as usize] = node as NodeId;
            }
        }
        self.contained = contained;
        self.in_cut = vec![false; num_clusters];
        self.partition = (0..num_clusters as NodeId).collect();
    }

    fn check_node(&self, v: NodeId) -> Result<()> {
        if (v as usize) < self.adjacency.len() {
            Ok(())
        } else {
            Err(MinCutError::InvalidVertex(u64::from(v)))
        }
    }
}

impl MinCutGraph for MutableGraph {
    fn n(&self) -> usize {
        self.adjacency.len()
    }

    fn m(&self) -> usize {
        self.num_edges
    }

    fn neighbors(&self, v: NodeId) -> &[Neighbor] {
        &self.adjacency[v as usize]
    }

    fn from_parts(n: usize, degrees: &[usize], edges: Vec<(NodeId, NodeId, EdgeWeight)>) -> Self {
        let mut graph = Self::new(n);
        for (v, &d) in degrees.iter().enumerate() {
            graph.adjacency[v].reserve_exact(d);
        }
        graph.num_edges = edges.len();
        for (u, v, w) in edges {
            graph.adjacency[u as usize].push(Neighbor::new(v, w));
            graph.adjacency[v as usize].push(Neighbor::new(u, w));
        }
        graph
    }

    fn insert_edge(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(MinCutError::InvalidEdge(u64::from(u), u64::from(v)));
        }
        debug_assert!(weight > 0, "edge weights must be positive");

        self.adjacency[u as usize].push(Neighbor::new(v, weight));
        self.adjacency[v as usize].push(Neighbor::new(u, weight));
        self.num_edges += 1;
        Ok(())
    }

    fn delete_edge(&mut self, u: NodeId, v: NodeId) -> Result<EdgeWeight> {
        self.check_node(u)?;
        self.check_node(v)?;

        let not_found = || MinCutError::EdgeNotFound(u64::from(u), u64::from(v));
        let pos = self.adjacency[u as usize]
            .iter()
            .position(|e| e.target == v)
            .ok_or_else(not_found)?;
        let weight = self.adjacency[u as usize].swap_remove(pos).weight;

        let back = self.adjacency[v as usize]
            .iter()
            .position(|e| e.target == u && e.weight == weight)
            .ok_or_else(not_found)?;
        self.adjacency[v as usize].swap_remove(back);

        self.num_edges -= 1;
        Ok(weight)
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
