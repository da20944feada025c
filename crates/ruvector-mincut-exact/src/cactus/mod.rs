//! Cactus of all minimum cuts
//!
//! The cactus is the quotient of the input graph in which every edge that
//! lies in no minimum cut has been contracted. Each cactus node owns a
//! disjoint set of original vertices, every remaining edge crosses at least
//! one minimum cut, and the minimum cuts themselves are listed as vertex
//! bitmaps.
//!
//! Construction for a connected graph with minimum cut `λ`:
//!
//! 1. contract with capforest at bound `λ + 1` until it stalls; pairs merged
//!    there are more than `λ`-connected, so no minimum cut is lost
//! 2. enumerate every minimum cut of the reduced graph with max-flow
//! 3. merge nodes that no minimum cut separates
//!
//! For `λ = 0` the nodes are the connected components.

mod recursive;

pub use recursive::{RecursiveMinCut, RecursiveStep};

use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use roaring::RoaringBitmap;
use tracing::{debug, info};

use crate::capforest::{parallel_capforest, sequential_capforest};
use crate::config::MinCutConfig;
use crate::contraction::{contract_in_place, from_union_find};
use crate::flow::all_minimum_cuts;
use crate::graph::{connected_components, EdgeWeight, MinCutGraph, MutableGraph, NodeId};

/// Seed for the random cut labels that make up node signatures
const SIGNATURE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// All minimum cuts of a graph in contracted form
#[derive(Debug, Clone, Default)]
pub struct MinCutCactus {
    value: EdgeWeight,
    graph: MutableGraph,
    cuts: Vec<RoaringBitmap>,
    num_vertices: usize,
}

/// Builds a [`MinCutCactus`] with a given configuration
#[derive(Debug, Clone, Default)]
pub struct CactusBuilder {
    config: MinCutConfig,
}

impl CactusBuilder {
    /// Builder using `config` for the capforest reductions
    pub fn new(config: MinCutConfig) -> Self {
        Self { config }
    }

    /// Cactus of `graph`, whose minimum cut is `value`
    pub fn build<G: MinCutGraph>(&self, graph: &G, value: EdgeWeight) -> MinCutCactus {
        let n = graph.n();
        let cactus = if value == 0 {
            let components = connected_components(graph);
            let quotient = MutableGraph::new(components.len()).with_contained_vertices(components);
            MinCutCactus::from_quotient(0, quotient, n, None)
        } else {
            let reduced = self.reduce(graph, value);
            let node_cuts = all_minimum_cuts(&reduced, value);
            MinCutCactus::from_quotient(value, reduced, n, Some(node_cuts))
        };

        info!(
            n,
            value,
            nodes = cactus.num_nodes(),
            cuts = cactus.num_minimum_cuts(),
            "cactus built"
        );
        cactus
    }

    /// Contract everything capforest proves to be more than `value`-connected
    fn reduce<G: MinCutGraph>(&self, graph: &G, value: EdgeWeight) -> MutableGraph {
        let mut reduced = MutableGraph::from_graph(graph);
        let bound = value.saturating_add(1);
        let mut round = 0u64;

        while reduced.n() > 2 {
            let (mut uf, _) = parallel_capforest(&reduced, bound, &self.config, round);
            if uf.size() == reduced.n() {
                uf = sequential_capforest(&reduced, bound, self.config.queue_type).0;
            }
            if uf.size() == reduced.n() {
                break;
            }
            debug_assert!(uf.size() > 1, "a minimum cut was contracted away");
            let (mapping, reverse) = from_union_find(uf);
            contract_in_place(&mut reduced, &mapping, reverse.len());
            round += 1;
        }

        debug!(rounds = round, n = reduced.n(), "cactus reduction finished");
        reduced
    }
}

impl MinCutCactus {
    /// Cactus of `graph`, whose minimum cut is `value`
    pub fn build<G: MinCutGraph>(graph: &G, value: EdgeWeight, config: &MinCutConfig) -> Self {
        CactusBuilder::new(config.clone()).build(graph, value)
    }

    /// Finish from a quotient graph and the cuts of its nodes.
    ///
    /// Without node cuts every quotient node is taken as one side
    /// (the `λ = 0` component cactus).
    fn from_quotient(
        value: EdgeWeight,
        quotient: MutableGraph,
        num_vertices: usize,
        node_cuts: Option<Vec<Vec<NodeId>>>,
    ) -> Self {
        let mut cactus = Self {
            value,
            graph: quotient,
            cuts: Vec::new(),
            num_vertices,
        };
        let Some(node_cuts) = node_cuts else {
            cactus.push_component_cuts();
            return cactus;
        };

        for side in &node_cuts {
            let mut bitmap = RoaringBitmap::new();
            for &node in side {
                bitmap.extend(cactus.graph.contained_vertices(node).iter().copied());
            }
            cactus.push_cut(bitmap);
        }
        cactus.merge_unseparated();
        cactus
    }

    /// Add a cut in canonical form (the side without vertex 0).
    ///
    /// Callers hand in distinct cuts; empty sides are skipped.
    fn push_cut(&mut self, side: RoaringBitmap) {
        let side = if side.contains(0) {
            let mut all = RoaringBitmap::new();
            all.insert_range(0..self.num_vertices as u32);
            all - side
        } else {
            side
        };
        if !side.is_empty() {
            self.cuts.push(side);
        }
    }

    /// List one cut per component of a `λ = 0` cactus.
    ///
    /// With exactly two components both sides name the same cut, so the
    /// component holding vertex 0 is skipped.
    fn push_component_cuts(&mut self) {
        self.cuts.clear();
        let nodes = self.num_nodes();
        if nodes < 2 {
            return;
        }
        for c in 0..nodes as NodeId {
            let side: RoaringBitmap = self.graph.contained_vertices(c).iter().copied().collect();
            if nodes == 2 && side.contains(0) {
                continue;
            }
            self.push_cut(side);
        }
    }

    /// Contract cactus nodes that lie on the same side of every listed cut
    fn merge_unseparated(&mut self) {
        let nodes = self.graph.n();
        if self.value == 0 {
            // nodes are components and no edge joins them
            return;
        }

        // each vertex gets the XOR of a random label per cut containing it,
        // so two nodes share a signature iff no cut separates them (up to
        // a 64-bit collision)
        let mut rng = StdRng::seed_from_u64(SIGNATURE_SEED);
        let mut labels = vec![0u64; self.num_vertices];
        for cut in &self.cuts {
            let label: u64 = rng.gen();
            for v in cut {
                labels[v as usize] ^= label;
            }
        }

        let mut classes: HashMap<u64, NodeId> = HashMap::with_capacity(nodes);
        let mapping: Vec<NodeId> = (0..nodes as NodeId)
            .map(|node| {
                let signature = self
                    .graph
                    .contained_vertices(node)
                    .first()
                    .map_or(0, |&v| labels[v as usize]);
                let next = classes.len() as NodeId;
                *classes.entry(signature).or_insert(next)
            })
            .collect();

        if classes.len() < nodes {
            contract_in_place(&mut self.graph, &mapping, classes.len());
        }
    }

    /// Minimum cut value
    pub fn value(&self) -> EdgeWeight {
        self.value
    }

    /// Number of cactus nodes
    pub fn num_nodes(&self) -> usize {
        self.graph.n()
    }

    /// Number of original vertices covered
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// The cactus as a graph whose nodes carry their original vertices
    pub fn graph(&self) -> &MutableGraph {
        &self.graph
    }

    /// Cactus node holding original vertex `v`
    pub fn node_of(&self, v: NodeId) -> Option<NodeId> {
        self.graph.current_position(v)
    }

    /// Original vertices of cactus node `node`
    pub fn contained_vertices(&self, node: NodeId) -> &[NodeId] {
        self.graph.contained_vertices(node)
    }

    /// Every minimum cut as the side not containing vertex 0
    pub fn minimum_cuts(&self) -> &[RoaringBitmap] {
        &self.cuts
    }

    /// Number of distinct minimum cuts listed
    pub fn num_minimum_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// Whether `u` and `v` are separated by some minimum cut
    pub fn is_cut_edge(&self, u: NodeId, v: NodeId) -> bool {
        match (self.node_of(u), self.node_of(v)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    /// The minimum cut whose sides differ least in size
    pub fn most_balanced_cut(&self) -> Option<RoaringBitmap> {
        let n = self.num_vertices as u64;
        self.cuts
            .iter()
            .min_by_key(|side| n.abs_diff(2 * side.len()))
            .cloned()
    }

    /// Drop every cut separating `u` and `v`, then merge nodes that are no
    /// longer separated. Returns the number of cuts left.
    pub fn retain_cuts_not_separating(&mut self, u: NodeId, v: NodeId) -> usize {
        let before = self.cuts.len();
        self.cuts.retain(|cut| cut.contains(u) == cut.contains(v));
        if self.cuts.len() < before {
            self.merge_unseparated();
        }
        debug!(
            removed = before - self.cuts.len(),
            remaining = self.cuts.len(),
            nodes = self.num_nodes(),
            "cactus refined"
        );
        self.cuts.len()
    }

    /// Add an edge of the underlying graph between the nodes of `u` and `v`
    pub fn add_crossing_edge(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) {
        match (self.node_of(u), self.node_of(v)) {
            (Some(a), Some(b)) if a != b => {
                // both nodes exist and differ, so insertion cannot fail
                let _ = self.graph.insert_edge(a, b, weight);
            }
            _ => {}
        }
    }

    /// Merge the components of `u` and `v` in a `λ = 0` cactus.
    ///
    /// Returns the number of components left.
    pub fn merge_components(&mut self, u: NodeId, v: NodeId) -> usize {
        debug_assert_eq!(self.value, 0);
        let (Some(a), Some(b)) = (self.node_of(u), self.node_of(v)) else {
            return self.num_nodes();
        };
        if a != b {
            let (keep, gone) = (a.min(b), a.max(b));
            let mapping: Vec<NodeId> = (0..self.num_nodes() as NodeId)
                .map(|c| match c.cmp(&gone) {
                    std::cmp::Ordering::Less => c,
                    std::cmp::Ordering::Equal => keep,
                    std::cmp::Ordering::Greater => c - 1,
                })
                .collect();
            let remaining = self.num_nodes() - 1;
            contract_in_place(&mut self.graph, &mapping, remaining);
            self.push_component_cuts();
        }
        self.num_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StaticGraph;

    fn config() -> MinCutConfig {
        MinCutConfig::default()
    }

    fn cycle(n: u32) -> MutableGraph {
        let edges = (0..n).map(|v| (v.min((v + 1) % n), v.max((v + 1) % n), 1)).collect();
        MutableGraph::from_edge_list(n as usize, edges)
    }

    #[test]
    fn test_unique_cut_gives_two_nodes() {
        let mut edges = Vec::new();
        for offset in [0u32, 4] {
            for u in 0..4 {
                for v in (u + 1)..4 {
                    edges.push((offset + u, offset + v, 1));
                }
            }
        }
        edges.push((0, 4, 1));
        let g = StaticGraph::from_edge_list(8, edges);

        let cactus = MinCutCactus::build(&g, 1, &config());
        assert_eq!(cactus.num_nodes(), 2);
        assert_eq!(cactus.num_minimum_cuts(), 1);
        assert_eq!(cactus.graph().m(), 1);
        assert!(cactus.is_cut_edge(0, 4));
        assert!(!cactus.is_cut_edge(1, 2));
        let side: Vec<u32> = cactus.minimum_cuts()[0].iter().collect();
        assert_eq!(side, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_cycle_keeps_every_vertex() {
        let g = cycle(6);
        let cactus = MinCutCactus::build(&g, 2, &config());
        assert_eq!(cactus.num_nodes(), 6);
        assert_eq!(cactus.num_minimum_cuts(), 15);
        for cut in cactus.minimum_cuts() {
            assert!(!cut.contains(0));
        }
    }

    #[test]
    fn test_most_balanced_cut() {
        let g = cycle(6);
        let cactus = MinCutCactus::build(&g, 2, &config());
        let side = cactus.most_balanced_cut().unwrap();
        assert_eq!(side.len(), 3);
    }

    #[test]
    fn test_retain_cuts_not_separating() {
        let mut cactus = MinCutCactus::build(&cycle(4), 2, &config());
        assert_eq!(cactus.num_minimum_cuts(), 6);

        // cuts of a 4-cycle not separating 0 and 2 are the singletons {1} and {3}
        let remaining = cactus.retain_cuts_not_separating(0, 2);
        assert_eq!(remaining, 2);
        assert_eq!(cactus.num_nodes(), 3);
        assert_eq!(cactus.node_of(0), cactus.node_of(2));
        assert!(cactus.is_cut_edge(0, 1));
    }

    #[test]
    fn test_component_cactus() {
        let g = MutableGraph::from_edge_list(6, vec![(0, 1, 1), (2, 3, 1), (4, 5, 2)]);
        let mut cactus = MinCutCactus::build(&g, 0, &config());
        assert_eq!(cactus.value(), 0);
        assert_eq!(cactus.num_nodes(), 3);
        assert_eq!(cactus.num_minimum_cuts(), 3);
        assert!(cactus.is_cut_edge(1, 2));

        assert_eq!(cactus.merge_components(1, 2), 2);
        assert_eq!(cactus.num_minimum_cuts(), 1);
        assert_eq!(cactus.node_of(0), cactus.node_of(3));

        assert_eq!(cactus.merge_components(0, 5), 1);
        assert_eq!(cactus.num_minimum_cuts(), 0);
    }

    #[test]
    fn test_two_components_listed_once() {
        let g = MutableGraph::from_edge_list(4, vec![(0, 1, 1), (2, 3, 1)]);
        let cactus = MinCutCactus::build(&g, 0, &config());
        assert_eq!(cactus.num_nodes(), 2);
        assert_eq!(cactus.num_minimum_cuts(), 1);
    }

    #[test]
    fn test_large_cycle_builds_quickly() {
        // every pair of edges of a 300-cycle is a minimum cut
        let start = std::time::Instant::now();
        let cactus = MinCutCactus::build(&cycle(300), 2, &config());
        let elapsed = start.elapsed();

        assert_eq!(cactus.num_nodes(), 300);
        assert_eq!(cactus.num_minimum_cuts(), 300 * 299 / 2);
        assert!(
            elapsed < std::time::Duration::from_secs(30),
            "cactus of a 300-cycle took {elapsed:?}"
        );
    }

    #[test]
    fn test_merge_keeps_separated_nodes_apart() {
        // 0-1 heavy, so {0,1} is one node; the 4-cycle of nodes keeps 4 nodes
        let g = MutableGraph::from_edge_list(
            5,
            vec![(0, 1, 5), (1, 2, 1), (2, 3, 1), (3, 4, 1), (0, 4, 1)],
        );
        let mut cactus = MinCutCactus::build(&g, 2, &config());
        assert_eq!(cactus.num_nodes(), 4);
        assert_eq!(cactus.node_of(0), cactus.node_of(1));

        assert_eq!(cactus.retain_cuts_not_separating(2, 4), 2);
        assert_eq!(cactus.num_nodes(), 3);
        assert_eq!(cactus.node_of(2), cactus.node_of(4));
        assert!(cactus.is_cut_edge(2, 3));
        assert!(cactus.is_cut_edge(0, 2));
    }

    #[test]
    fn test_contained_vertices_partition_all() {
        let g = cycle(5);
        let cactus = MinCutCactus::build(&g, 2, &config());
        let mut all: Vec<NodeId> = (0..cactus.num_nodes() as NodeId)
            .flat_map(|c| cactus.contained_vertices(c).to_vec())
            .collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }
}
