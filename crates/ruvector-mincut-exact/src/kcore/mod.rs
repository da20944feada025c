//! k-core decomposition
//!
//! Core numbers by the Batagelj–Zaversnik bucket algorithm in `O(n + m)`.
//! The `k`-core of a graph is its largest subgraph of minimum degree `k`;
//! cores whose minimum cut is below their minimum degree have non-trivial
//! cuts and are the interesting inputs for the cut algorithms.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::contraction_minimum_cut;
use crate::config::MinCutConfig;
use crate::graph::{
    extract_block, largest_component, EdgeWeight, MinCutGraph, NodeId, StaticGraph,
};

/// Core numbers of every vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreDecomposition {
    core: Vec<u32>,
    /// Vertices in non-decreasing core order
    order: Vec<NodeId>,
}

/// A core whose minimum cut is below its minimum degree
#[derive(Debug, Clone)]
pub struct CoreCut {
    /// Core level
    pub k: u32,
    /// Largest connected component of the core
    pub graph: StaticGraph,
    /// Original id of each vertex of `graph`
    pub vertices: Vec<NodeId>,
    /// Minimum cut of `graph`
    pub cut: EdgeWeight,
    /// Minimum weighted degree of `graph`
    pub min_degree: EdgeWeight,
}

impl CoreDecomposition {
    /// Compute core numbers; degrees count adjacency entries
    pub fn batagelj_zaversnik<G: MinCutGraph>(graph: &G) -> Self {
        let n = graph.n();
        let mut degree: Vec<usize> = graph
            .nodes()
            .map(|v| graph.unweighted_degree(v))
            .collect();
        let max_degree = degree.iter().copied().max().unwrap_or(0);

        // bucket start of every degree
        let mut bin = vec![0usize; max_degree + 1];
        for &d in &degree {
            bin[d] += 1;
        }
        let mut start = 0;
        for slot in bin.iter_mut() {
            let count = *slot;
            *slot = start;
            start += count;
        }

        let mut order: Vec<NodeId> = vec![0; n];
        let mut position = vec![0usize; n];
        {
            let mut next = bin.clone();
            for v in 0..n {
                position[v] = next[degree[v]];
                order[position[v]] = v as NodeId;
                next[degree[v]] += 1;
            }
        }

        for i in 0..n {
            let v = order[i];
            for edge in graph.neighbors(v) {
                let u = edge.target as usize;
                if degree[u] > degree[v as usize] {
                    let du = degree[u];
                    let pu = position[u];
                    let pw = bin[du];
                    let w = order[pw] as usize;
                    if u != w {
                        order.swap(pu, pw);
                        position[u] = pw;
                        position[w] = pu;
                    }
                    bin[du] += 1;
                    degree[u] -= 1;
                }
            }
        }

        let core = degree.into_iter().map(|d| d as u32).collect();
        Self { core, order }
    }

    /// Core number of `v`
    pub fn core_number(&self, v: NodeId) -> u32 {
        self.core[v as usize]
    }

    /// All core numbers
    pub fn core_numbers(&self) -> &[u32] {
        &self.core
    }

    /// Highest core number
    pub fn max_core(&self) -> u32 {
        self.order
            .last()
            .map_or(0, |&v| self.core[v as usize])
    }

    /// Distinct core numbers in increasing order
    pub fn levels(&self) -> Vec<u32> {
        let mut levels: Vec<u32> = self.order.iter().map(|&v| self.core[v as usize]).collect();
        levels.dedup();
        levels
    }

    /// Vertices of the `k`-core
    pub fn core_vertices(&self, k: u32) -> Vec<NodeId> {
        let mut vertices: Vec<NodeId> = (0..self.core.len() as NodeId)
            .filter(|&v| self.core[v as usize] >= k)
            .collect();
        vertices.sort_unstable();
        vertices
    }

    /// Largest connected component of the `k`-core, with original ids
    pub fn core_graph<G: MinCutGraph>(
        &self,
        graph: &G,
        k: u32,
    ) -> Option<(StaticGraph, Vec<NodeId>)> {
        let vertices = self.core_vertices(k);
        if vertices.is_empty() {
            return None;
        }
        let (induced, induced_ids) = extract_block(graph, &vertices);
        let (component, component_ids) = largest_component(&induced);
        let component = StaticGraph::from_graph(&component);
        let ids = component_ids
            .iter()
            .map(|&v| induced_ids[v as usize])
            .collect();
        debug!(k, n = component.n(), m = component.m(), "core graph");
        Some((component, ids))
    }

    /// Lowest core level `k >= 2` whose core graph has a minimum cut below
    /// its minimum degree
    pub fn lowest_interesting_core<G: MinCutGraph>(
        &self,
        graph: &G,
        config: &MinCutConfig,
    ) -> Option<CoreCut> {
        for k in self.levels().into_iter().filter(|&k| k >= 2) {
            let Some((core, vertices)) = self.core_graph(graph, k) else {
                continue;
            };
            let Some((_, min_degree)) = core.min_degree() else {
                continue;
            };
            let Some(result) = contraction_minimum_cut(&core, config, true) else {
                continue;
            };
            if result.value < min_degree {
                debug!(k, cut = result.value, min_degree, "small minimum cut in core");
                return Some(CoreCut {
                    k,
                    graph: core,
                    vertices,
                    cut: result.value,
                    min_degree,
                });
            }
            debug!(k, cut = result.value, "core cut equals minimum degree");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clique(offset: NodeId, k: NodeId) -> Vec<(NodeId, NodeId, EdgeWeight)> {
        let mut edges = Vec::new();
        for u in 0..k {
            for v in (u + 1)..k {
                edges.push((offset + u, offset + v, 1));
            }
        }
        edges
    }

    fn cliques_with_pendant() -> StaticGraph {
        let mut edges = clique(0, 5);
        edges.extend(clique(5, 5));
        edges.push((0, 5, 1));
        edges.push((0, 10, 1));
        StaticGraph::from_edge_list(11, edges)
    }

    #[test]
    fn test_core_numbers() {
        let g = StaticGraph::from_edge_list(4, vec![(0, 1, 1), (1, 2, 1), (0, 2, 1), (2, 3, 1)]);
        let cores = CoreDecomposition::batagelj_zaversnik(&g);
        assert_eq!(cores.core_numbers(), &[2, 2, 2, 1]);
        assert_eq!(cores.max_core(), 2);
        assert_eq!(cores.levels(), vec![1, 2]);
        assert_eq!(cores.core_vertices(2), vec![0, 1, 2]);
    }

    #[test]
    fn test_core_graph_drops_pendant() {
        let g = cliques_with_pendant();
        let cores = CoreDecomposition::batagelj_zaversnik(&g);
        assert_eq!(cores.core_number(10), 1);
        assert_eq!(cores.core_number(3), 4);

        let (core, ids) = cores.core_graph(&g, 4).unwrap();
        assert_eq!(core.n(), 10);
        assert_eq!(core.m(), 21);
        assert!(!ids.contains(&10));
        assert!(cores.core_graph(&g, 5).is_none());
    }

    #[test]
    fn test_lowest_interesting_core() {
        let g = cliques_with_pendant();
        let cores = CoreDecomposition::batagelj_zaversnik(&g);
        let found = cores
            .lowest_interesting_core(&g, &MinCutConfig::default())
            .unwrap();
        assert_eq!(found.k, 4);
        assert_eq!(found.cut, 1);
        assert_eq!(found.min_degree, 4);
    }

    #[test]
    fn test_clique_is_not_interesting() {
        let g = StaticGraph::from_edge_list(5, clique(0, 5));
        let cores = CoreDecomposition::batagelj_zaversnik(&g);
        assert!(cores.lowest_interesting_core(&g, &MinCutConfig::default()).is_none());
    }
}
