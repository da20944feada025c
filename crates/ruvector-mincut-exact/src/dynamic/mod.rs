//! Dynamic minimum cut maintenance
//!
//! [`DynamicMinCut`] keeps the current graph, the minimum cut value and the
//! cactus of all minimum cuts, and answers each edge update without a full
//! recomputation whenever the cactus proves that is safe:
//!
//! - **insertion** never lowers the cut; if the endpoints share a cactus node
//!   nothing changes, otherwise only the minimum cuts separating them are
//!   dropped. The static algorithm runs only when no minimum cut survives.
//! - **deletion** of an edge between two cactus nodes removes weight from a
//!   minimum cut, so the static algorithm runs. Deleting an edge inside a
//!   cactus node keeps the value unless a bounded connectivity check between
//!   its endpoints falls below it.
//!
//! When an update changes the set of minimum cuts in a way the cactus cannot
//! follow, the cactus is dropped and rebuilt on the next query.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::algorithm::CactusMinCut;
use crate::cactus::MinCutCactus;
use crate::config::MinCutConfig;
use crate::error::{MinCutError, Result};
use crate::flow::bounded_connectivity;
use crate::frontier::QueueType;
use crate::graph::{EdgeWeight, MinCutGraph, MutableGraph, NodeId};

/// One update of an edge stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeUpdate {
    /// Insert an edge
    Insert {
        /// First endpoint
        u: NodeId,
        /// Second endpoint
        v: NodeId,
        /// Edge weight
        weight: EdgeWeight,
    },
    /// Delete one edge between two vertices
    Delete {
        /// First endpoint
        u: NodeId,
        /// Second endpoint
        v: NodeId,
    },
}

/// Result of applying a batch of updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Minimum cut after the last applied update
    pub cut: EdgeWeight,
    /// Updates applied (including ignored and skipped ones)
    pub applied: usize,
    /// Updates after which the cut value differed from before
    pub cut_changes: usize,
    /// Whether the time budget ran out before the batch finished
    pub timed_out: bool,
}

/// Statistics about dynamic maintenance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicStats {
    /// Total number of insertions
    pub insertions: u64,
    /// Total number of deletions
    pub deletions: u64,
    /// Runs of the static algorithm (including initialization)
    pub static_runs: u64,
    /// Bounded connectivity checks after deletions
    pub connectivity_checks: u64,
    /// Insertions answered by refining the cactus
    pub cactus_refinements: u64,
    /// Lazy cactus rebuilds
    pub cactus_rebuilds: u64,
    /// Average update time in microseconds
    pub avg_update_time_us: f64,
}

/// Minimum cut of a graph under edge insertions and deletions
pub struct DynamicMinCut {
    graph: MutableGraph,
    cactus: Option<MinCutCactus>,
    cut: EdgeWeight,
    static_calls: usize,
    solver: CactusMinCut,
    config: MinCutConfig,
    stats: DynamicStats,
}

impl std::fmt::Debug for DynamicMinCut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicMinCut")
            .field("n", &self.graph.n())
            .field("m", &self.graph.m())
            .field("cut", &self.cut)
            .field("static_calls", &self.static_calls)
            .field("cactus_valid", &self.cactus.is_some())
            .finish()
    }
}

impl DynamicMinCut {
    /// Create an empty structure; call [`Self::initialize`] before updates
    pub fn new(config: MinCutConfig) -> Result<Self> {
        let solver = CactusMinCut::new(config.clone())?;
        Ok(Self {
            graph: MutableGraph::default(),
            cactus: None,
            cut: 0,
            static_calls: 0,
            solver,
            config,
            stats: DynamicStats::default(),
        })
    }

    /// Load `graph` and compute its minimum cut and cactus
    pub fn initialize<G: MinCutGraph>(&mut self, graph: &G) -> Result<EdgeWeight> {
        if graph.n() < 2 {
            return Err(MinCutError::EmptyGraph);
        }
        self.graph = MutableGraph::from_graph(graph);
        self.static_calls = 0;
        self.stats = DynamicStats::default();
        self.recompute()
    }

    /// Run the static algorithm on the current graph
    fn recompute(&mut self) -> Result<EdgeWeight> {
        let (result, cactus) = self
            .solver
            .minimum_cut_with_cactus(&self.graph)
            .ok_or(MinCutError::EmptyGraph)?;
        self.cut = result.value;
        self.cactus = Some(cactus);
        self.static_calls += 1;
        self.stats.static_runs += 1;
        debug!(cut = self.cut, calls = self.static_calls, "static recomputation");
        Ok(self.cut)
    }

    /// Rebuild a stale cactus around the known cut value
    fn ensure_cactus(&mut self) -> &mut MinCutCactus {
        if self.cactus.is_none() {
            self.stats.cactus_rebuilds += 1;
        }
        let (graph, cut, config) = (&self.graph, self.cut, &self.config);
        self.cactus
            .get_or_insert_with(|| MinCutCactus::build(graph, cut, config))
    }

    fn record_update(&mut self, start: Instant) {
        let stats = &mut self.stats;
        let updates = (stats.insertions + stats.deletions).max(1) as f64;
        let elapsed = start.elapsed().as_secs_f64() * 1e6;
        stats.avg_update_time_us += (elapsed - stats.avg_update_time_us) / updates;
    }

    /// Insert an edge and return the new minimum cut.
    ///
    /// Self-loops are ignored. Endpoints beyond the current vertex range add
    /// new vertices and force a recomputation.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) -> Result<EdgeWeight> {
        if u == v {
            trace!(u, "self-loop insertion ignored");
            return Ok(self.cut);
        }
        if weight == 0 {
            return Err(MinCutError::InvalidEdge(u64::from(u), u64::from(v)));
        }
        let start = Instant::now();
        self.stats.insertions += 1;

        let highest = u.max(v) as usize;
        if highest >= self.graph.n() {
            while self.graph.n() <= highest {
                self.graph.add_node();
            }
            self.graph.insert_edge(u, v, weight)?;
            trace!(u, v, "insertion grows the graph");
            let cut = self.recompute()?;
            self.record_update(start);
            return Ok(cut);
        }

        self.ensure_cactus();
        self.graph.insert_edge(u, v, weight)?;

        let zero_cut = self.cut == 0;
        let Some(cactus) = self.cactus.as_mut() else {
            return Err(MinCutError::InternalError("cactus missing".into()));
        };

        if !cactus.is_cut_edge(u, v) {
            trace!(u, v, "insertion inside a cactus node");
            self.record_update(start);
            return Ok(self.cut);
        }

        let still_cut = if zero_cut {
            cactus.merge_components(u, v) > 1
        } else {
            let remaining = cactus.retain_cuts_not_separating(u, v);
            if remaining > 0 {
                cactus.add_crossing_edge(u, v, weight);
            }
            remaining > 0
        };

        let cut = if still_cut {
            self.stats.cactus_refinements += 1;
            trace!(u, v, cut = self.cut, "cactus refined");
            self.cut
        } else {
            trace!(u, v, "no minimum cut survives the insertion");
            self.recompute()?
        };
        self.record_update(start);
        Ok(cut)
    }

    /// Delete one edge between `u` and `v` and return the new minimum cut
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<EdgeWeight> {
        if u == v {
            trace!(u, "self-loop deletion ignored");
            return Ok(self.cut);
        }
        if u as usize >= self.graph.n() || v as usize >= self.graph.n() {
            return Err(MinCutError::EdgeNotFound(u64::from(u), u64::from(v)));
        }
        if !self.graph.has_edge(u, v) {
            return Err(MinCutError::EdgeNotFound(u64::from(u), u64::from(v)));
        }
        let start = Instant::now();
        self.stats.deletions += 1;

        let crosses = self.ensure_cactus().is_cut_edge(u, v);
        self.graph.delete_edge(u, v)?;

        if crosses {
            trace!(u, v, "deleted a minimum cut edge");
            let cut = self.recompute()?;
            self.record_update(start);
            return Ok(cut);
        }

        let bound = self.cut.saturating_add(1);
        let connectivity = bounded_connectivity(
            &self.graph,
            u,
            v,
            bound,
            self.config.depth_of_partial_relabeling,
        );
        self.stats.connectivity_checks += 1;

        if connectivity <= self.cut {
            // new minimum cuts separate u and v
            self.cut = connectivity;
            self.cactus = None;
        }
        trace!(u, v, connectivity, cut = self.cut, "deletion inside a cactus node");
        self.record_update(start);
        Ok(self.cut)
    }

    /// Apply one update
    pub fn apply(&mut self, update: EdgeUpdate) -> Result<EdgeWeight> {
        match update {
            EdgeUpdate::Insert { u, v, weight } => self.add_edge(u, v, weight),
            EdgeUpdate::Delete { u, v } => self.remove_edge(u, v),
        }
    }

    /// Apply a stream of updates within an optional time budget.
    ///
    /// When the budget runs out the remaining updates are abandoned; every
    /// update applied so far leaves the graph consistent. Deletions of
    /// missing edges are skipped.
    pub fn apply_updates<I>(&mut self, updates: I, budget: Option<Duration>) -> BatchOutcome
    where
        I: IntoIterator<Item = EdgeUpdate>,
    {
        let start = Instant::now();
        let mut outcome = BatchOutcome {
            cut: self.cut,
            applied: 0,
            cut_changes: 0,
            timed_out: false,
        };

        for update in updates {
            if budget.is_some_and(|limit| start.elapsed() >= limit) {
                outcome.timed_out = true;
                warn!(applied = outcome.applied, "update batch timed out");
                break;
            }
            let before = self.cut;
            if let Err(err) = self.apply(update) {
                warn!(?update, %err, "update skipped");
            }
            outcome.applied += 1;
            if self.cut != before {
                outcome.cut_changes += 1;
            }
        }

        outcome.cut = self.cut;
        outcome
    }

    /// Current minimum cut value
    pub fn current_cut(&self) -> EdgeWeight {
        self.cut
    }

    /// Cactus of the current graph, rebuilt first if stale
    pub fn current_cactus(&mut self) -> &MinCutCactus {
        self.ensure_cactus()
    }

    /// Whether the cached cactus is up to date
    pub fn has_valid_cactus(&self) -> bool {
        self.cactus.is_some()
    }

    /// Number of static algorithm runs since initialization
    pub fn calls_of_static_algorithm(&self) -> usize {
        self.static_calls
    }

    /// The current graph
    pub fn graph(&self) -> &MutableGraph {
        &self.graph
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.graph.n()
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.graph.m()
    }

    /// Configuration in use
    pub fn config(&self) -> &MinCutConfig {
        &self.config
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> DynamicStats {
        self.stats.clone()
    }

    /// Reset the statistics
    pub fn reset_stats(&mut self) {
        self.stats = DynamicStats::default();
    }
}

/// Builder for [`DynamicMinCut`]
///
/// ```
/// use ruvector_mincut_exact::prelude::*;
///
/// let mut mincut = MinCutBuilder::new()
///     .with_edges(vec![(0, 1, 1), (1, 2, 1), (2, 0, 1)])
///     .build()
///     .unwrap();
/// assert_eq!(mincut.current_cut(), 2);
///
/// mincut.add_edge(0, 1, 3).unwrap();
/// assert_eq!(mincut.current_cut(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MinCutBuilder {
    config: MinCutConfig,
    vertices: usize,
    edges: Vec<(NodeId, NodeId, EdgeWeight)>,
}

impl MinCutBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a full configuration
    pub fn with_config(mut self, config: MinCutConfig) -> Self {
        self.config = config;
        self
    }

    /// Reserve at least `n` vertices
    pub fn with_vertices(mut self, n: usize) -> Self {
        self.vertices = n;
        self
    }

    /// Add initial edges
    pub fn with_edges(mut self, edges: Vec<(NodeId, NodeId, EdgeWeight)>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Frontier used by the capforest
    pub fn queue_type(mut self, queue_type: QueueType) -> Self {
        self.config.queue_type = queue_type;
        self
    }

    /// Seed for capforest start vertices
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Worker threads (0 = global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = n;
        self
    }

    /// BFS depth of partial global relabelling
    pub fn depth_of_partial_relabeling(mut self, depth: usize) -> Self {
        self.config.depth_of_partial_relabeling = depth;
        self
    }

    /// Build and initialize
    pub fn build(self) -> Result<DynamicMinCut> {
        let n = self
            .edges
            .iter()
            .map(|&(u, v, _)| u.max(v) as usize + 1)
            .max()
            .unwrap_or(0)
            .max(self.vertices);

        let mut graph = MutableGraph::new(n);
        for (u, v, w) in self.edges {
            if u == v {
                continue;
            }
            if w == 0 {
                return Err(MinCutError::InvalidEdge(u64::from(u), u64::from(v)));
            }
            graph.insert_edge(u, v, w)?;
        }

        let mut mincut = DynamicMinCut::new(self.config)?;
        mincut.initialize(&graph)?;
        Ok(mincut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::minimum_cut_value;

    fn two_cliques(k: u32) -> Vec<(NodeId, NodeId, EdgeWeight)> {
        let mut edges = Vec::new();
        for offset in [0, k] {
            for u in 0..k {
                for v in (u + 1)..k {
                    edges.push((offset + u, offset + v, 1));
                }
            }
        }
        edges.push((0, k, 1));
        edges.push((1, k + 1, 1));
        edges
    }

    #[test]
    fn test_initialize_rejects_tiny_graphs() {
        let mut mincut = DynamicMinCut::new(MinCutConfig::default()).unwrap();
        assert!(matches!(
            mincut.initialize(&MutableGraph::new(1)),
            Err(MinCutError::EmptyGraph)
        ));
    }

    #[test]
    fn test_insert_inside_node_keeps_everything() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        assert_eq!(mincut.current_cut(), 2);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);

        assert_eq!(mincut.add_edge(2, 3, 1).unwrap(), 2);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);
        assert!(mincut.has_valid_cactus());
    }

    #[test]
    fn test_insert_across_unique_cut_recomputes() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        assert_eq!(mincut.add_edge(2, 6, 1).unwrap(), 3);
        assert_eq!(mincut.calls_of_static_algorithm(), 2);
    }

    #[test]
    fn test_insert_refines_cycle_cactus() {
        let edges = (0..6).map(|v| (v, (v + 1) % 6, 1)).collect();
        let mut mincut = MinCutBuilder::new().with_edges(edges).build().unwrap();
        assert_eq!(mincut.current_cut(), 2);

        // a chord leaves the cuts on either side of it intact
        assert_eq!(mincut.add_edge(0, 3, 1).unwrap(), 2);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);
        assert_eq!(mincut.stats().cactus_refinements, 1);
        assert_eq!(minimum_cut_value(mincut.graph()), Some(2));
    }

    #[test]
    fn test_self_loops_ignored() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(3)).build().unwrap();
        let m = mincut.num_edges();
        assert_eq!(mincut.add_edge(1, 1, 5).unwrap(), 2);
        assert_eq!(mincut.remove_edge(1, 1).unwrap(), 2);
        assert_eq!(mincut.num_edges(), m);
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(3)).build().unwrap();
        assert!(matches!(
            mincut.remove_edge(0, 5),
            Err(MinCutError::EdgeNotFound(0, 5))
        ));
        assert!(matches!(
            mincut.remove_edge(0, 50),
            Err(MinCutError::EdgeNotFound(0, 50))
        ));
    }

    #[test]
    fn test_remove_cut_edge_recomputes() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        assert_eq!(mincut.remove_edge(0, 4).unwrap(), 1);
        assert_eq!(mincut.calls_of_static_algorithm(), 2);
    }

    #[test]
    fn test_remove_non_cut_edge_keeps_value() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(5)).build().unwrap();
        assert_eq!(mincut.remove_edge(2, 3).unwrap(), 2);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);
        assert_eq!(mincut.stats().connectivity_checks, 1);
        assert!(mincut.has_valid_cactus());
    }

    #[test]
    fn test_remove_inside_node_lowers_cut() {
        // two 4-cliques of weight 2 edges joined by bridges of weight 2 and 3
        let mut edges = Vec::new();
        for offset in [0, 4] {
            for u in 0..4 {
                for v in (u + 1)..4 {
                    edges.push((offset + u, offset + v, 2));
                }
            }
        }
        edges.extend([(0, 4, 2), (1, 5, 3)]);
        let mut mincut = MinCutBuilder::new().with_edges(edges).build().unwrap();
        assert_eq!(mincut.current_cut(), 5);
        assert_eq!(mincut.current_cactus().num_nodes(), 2);

        // 2 and 3 drop to degree 4 once their shared edge is gone
        assert_eq!(mincut.remove_edge(2, 3).unwrap(), 4);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);
        assert!(!mincut.has_valid_cactus());
        assert_eq!(minimum_cut_value(mincut.graph()), Some(4));

        let cactus = mincut.current_cactus();
        assert_eq!(cactus.value(), 4);
        assert_eq!(cactus.num_minimum_cuts(), 2);
        assert_eq!(mincut.stats().cactus_rebuilds, 1);
    }

    #[test]
    fn test_new_vertex_forces_recompute() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(3)).build().unwrap();
        assert_eq!(mincut.add_edge(0, 6, 1).unwrap(), 1);
        assert_eq!(mincut.num_vertices(), 7);
        assert_eq!(mincut.calls_of_static_algorithm(), 2);
    }

    #[test]
    fn test_zero_cut_components_merge() {
        let mut mincut = MinCutBuilder::new()
            .with_edges(vec![(0, 1, 1), (2, 3, 1), (4, 5, 1)])
            .build()
            .unwrap();
        assert_eq!(mincut.current_cut(), 0);

        assert_eq!(mincut.add_edge(1, 2, 1).unwrap(), 0);
        assert_eq!(mincut.calls_of_static_algorithm(), 1);

        assert_eq!(mincut.add_edge(3, 4, 1).unwrap(), 1);
        assert_eq!(mincut.calls_of_static_algorithm(), 2);
    }

    #[test]
    fn test_apply_updates_counts_changes() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        let outcome = mincut.apply_updates(
            vec![
                EdgeUpdate::Delete { u: 0, v: 4 },
                EdgeUpdate::Delete { u: 0, v: 7 },
                EdgeUpdate::Insert { u: 0, v: 4, weight: 1 },
            ],
            None,
        );
        assert_eq!(outcome.applied, 3);
        assert_eq!(outcome.cut, 2);
        assert_eq!(outcome.cut_changes, 2);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn test_apply_updates_zero_budget_times_out() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        let outcome = mincut.apply_updates(
            vec![EdgeUpdate::Insert { u: 0, v: 5, weight: 1 }],
            Some(Duration::ZERO),
        );
        assert!(outcome.timed_out);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.cut, 2);
    }

    #[test]
    fn test_stats_track_updates_and_reset() {
        let mut mincut = MinCutBuilder::new().with_edges(two_cliques(4)).build().unwrap();
        assert_eq!(mincut.stats().static_runs, 1);

        mincut.add_edge(2, 3, 1).unwrap();
        mincut.remove_edge(5, 6).unwrap();
        mincut.remove_edge(0, 4).unwrap();
        let stats = mincut.stats();
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.static_runs, 2);
        assert_eq!(stats.connectivity_checks, 1);
        assert!(stats.avg_update_time_us >= 0.0);

        mincut.reset_stats();
        assert_eq!(mincut.stats(), DynamicStats::default());
        assert_eq!(mincut.calls_of_static_algorithm(), 2);
    }

    #[test]
    fn test_builder_rejects_zero_weight() {
        let result = MinCutBuilder::new().with_edges(vec![(0, 1, 0)]).build();
        assert!(matches!(result, Err(MinCutError::InvalidEdge(0, 1))));
    }
}
