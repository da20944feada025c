//! Static exact minimum cut algorithms
//!
//! Every solver implements [`MinimumCut`] for any graph backend:
//!
//! - [`ExactMinCut`]: parallel capforest rounds with a sequential fallback
//! - [`SequentialMinCut`]: sequential capforest rounds only
//! - [`CactusMinCut`]: exact value, then the cactus of all minimum cuts
//!
//! [`select_algorithm`] picks one from a [`MinCutConfig`].

mod helpers;

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::cactus::MinCutCactus;
use crate::config::{Algorithm, MinCutConfig};
use crate::error::Result;
use crate::graph::{EdgeWeight, MinCutGraph, NodeId};

pub(crate) use helpers::contraction_minimum_cut;

/// Result of a static minimum cut computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinCutResult {
    /// The minimum cut value
    pub value: EdgeWeight,
    /// Partition `(light, heavy)`; the light side is the one flagged in-cut
    pub partition: (Vec<NodeId>, Vec<NodeId>),
    /// Cut side flag per vertex
    pub in_cut: Vec<bool>,
    /// Edges crossing the cut as `(u, v, weight)` with `u < v`
    pub cut_edges: Vec<(NodeId, NodeId, EdgeWeight)>,
    /// Contraction rounds performed
    pub rounds: usize,
}

impl MinCutResult {
    /// Build a result from per-vertex side flags
    pub fn from_side<G: MinCutGraph>(
        graph: &G,
        value: EdgeWeight,
        in_cut: Vec<bool>,
        rounds: usize,
    ) -> Self {
        let (light, heavy): (Vec<NodeId>, Vec<NodeId>) =
            graph.nodes().partition(|&v| in_cut[v as usize]);
        let cut_edges: Vec<_> = graph
            .edge_list()
            .into_iter()
            .filter(|&(u, v, _)| in_cut[u as usize] != in_cut[v as usize])
            .collect();

        debug_assert_eq!(
            cut_edges.iter().map(|e| e.2).sum::<EdgeWeight>(),
            value,
            "reported cut value does not match the bipartition"
        );

        Self {
            value,
            partition: (light, heavy),
            in_cut,
            cut_edges,
            rounds,
        }
    }

    /// Vertices on the in-cut side
    pub fn light(&self) -> &[NodeId] {
        &self.partition.0
    }

    /// Vertices on the other side
    pub fn heavy(&self) -> &[NodeId] {
        &self.partition.1
    }

    /// Size difference between the two sides
    pub fn imbalance(&self) -> usize {
        self.partition.0.len().abs_diff(self.partition.1.len())
    }
}

/// Write the cut side into the per-vertex labels of `graph`.
///
/// `node_in_cut` holds the side flag and `partition_index` is `1` on the
/// in-cut side and `0` elsewhere.
pub fn label_graph<G: MinCutGraph>(graph: &mut G, result: &MinCutResult) {
    for v in graph.nodes() {
        let in_cut = result.in_cut[v as usize];
        graph.set_node_in_cut(v, in_cut);
        graph.set_partition_index(v, NodeId::from(in_cut));
    }
}

/// A static minimum cut solver
pub trait MinimumCut<G: MinCutGraph>: Send + Sync {
    /// Compute the minimum cut and a bipartition achieving it.
    ///
    /// Returns `None` for graphs with fewer than two vertices.
    fn minimum_cut(&self, graph: &G) -> Option<MinCutResult>;

    /// Configuration of this solver
    fn config(&self) -> &MinCutConfig;

    /// Short algorithm name
    fn name(&self) -> &'static str;

    /// Compute the minimum cut value, labelling `graph` when `save_cut` is set
    fn perform_minimum_cut(&self, graph: &mut G) -> Option<EdgeWeight> {
        let result = self.minimum_cut(graph)?;
        if self.config().save_cut {
            label_graph(graph, &result);
        }
        Some(result.value)
    }
}

fn build_pool(config: &MinCutConfig) -> Result<Option<ThreadPool>> {
    config.validate()?;
    if config.num_threads == 0 {
        return Ok(None);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()?;
    Ok(Some(pool))
}

fn install<R: Send>(pool: &Option<ThreadPool>, job: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(job),
        None => job(),
    }
}

/// Exact minimum cut with parallel capforest rounds
///
/// # Example
///
/// ```
/// use ruvector_mincut_exact::prelude::*;
///
/// let graph = StaticGraph::from_edge_list(4, vec![(0, 1, 3), (1, 2, 1), (2, 3, 3), (3, 0, 1)]);
/// let solver = ExactMinCut::new(MinCutConfig::default()).unwrap();
/// let result = solver.minimum_cut(&graph).unwrap();
/// assert_eq!(result.value, 2);
/// ```
#[derive(Debug)]
pub struct ExactMinCut {
    config: MinCutConfig,
    pool: Option<ThreadPool>,
}

impl ExactMinCut {
    /// Create a solver, building a dedicated pool if `num_threads > 0`
    pub fn new(config: MinCutConfig) -> Result<Self> {
        let pool = build_pool(&config)?;
        Ok(Self { config, pool })
    }
}

impl<G: MinCutGraph> MinimumCut<G> for ExactMinCut {
    fn minimum_cut(&self, graph: &G) -> Option<MinCutResult> {
        install(&self.pool, || contraction_minimum_cut(graph, &self.config, true))
    }

    fn config(&self) -> &MinCutConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "exact_parallel"
    }
}

/// Exact minimum cut with sequential capforest rounds
#[derive(Debug)]
pub struct SequentialMinCut {
    config: MinCutConfig,
    pool: Option<ThreadPool>,
}

impl SequentialMinCut {
    /// Create a solver
    pub fn new(config: MinCutConfig) -> Result<Self> {
        let pool = build_pool(&config)?;
        Ok(Self { config, pool })
    }
}

impl<G: MinCutGraph> MinimumCut<G> for SequentialMinCut {
    fn minimum_cut(&self, graph: &G) -> Option<MinCutResult> {
        install(&self.pool, || contraction_minimum_cut(graph, &self.config, false))
    }

    fn config(&self) -> &MinCutConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Exact minimum cut plus the cactus of all minimum cuts
///
/// With `find_most_balanced_cut` the reported bipartition is the most
/// balanced minimum cut.
#[derive(Debug)]
pub struct CactusMinCut {
    config: MinCutConfig,
    pool: Option<ThreadPool>,
}

impl CactusMinCut {
    /// Create a solver
    pub fn new(config: MinCutConfig) -> Result<Self> {
        let pool = build_pool(&config)?;
        Ok(Self { config, pool })
    }

    /// Minimum cut together with the cactus of all minimum cuts
    pub fn minimum_cut_with_cactus<G: MinCutGraph>(
        &self,
        graph: &G,
    ) -> Option<(MinCutResult, MinCutCactus)> {
        install(&self.pool, || {
            let exact = contraction_minimum_cut(graph, &self.config, true)?;
            let cactus = MinCutCactus::build(graph, exact.value, &self.config);
            let result = match cactus.most_balanced_cut() {
                Some(side) if self.config.find_most_balanced_cut => {
                    let in_cut = graph.nodes().map(|v| side.contains(v)).collect();
                    MinCutResult::from_side(graph, exact.value, in_cut, exact.rounds)
                }
                _ => exact,
            };
            Some((result, cactus))
        })
    }
}

impl<G: MinCutGraph> MinimumCut<G> for CactusMinCut {
    fn minimum_cut(&self, graph: &G) -> Option<MinCutResult> {
        self.minimum_cut_with_cactus(graph).map(|(result, _)| result)
    }

    fn config(&self) -> &MinCutConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "cactus"
    }
}

/// Solver for `config.algorithm`
pub fn select_algorithm<G: MinCutGraph + 'static>(
    config: &MinCutConfig,
) -> Result<Box<dyn MinimumCut<G>>> {
    let config = config.clone();
    Ok(match config.algorithm {
        Algorithm::ExactParallel => Box::new(ExactMinCut::new(config)?),
        Algorithm::Sequential => Box::new(SequentialMinCut::new(config)?),
        Algorithm::Cactus => Box::new(CactusMinCut::new(config)?),
    })
}

/// Minimum cut value with the default configuration
pub fn minimum_cut_value<G: MinCutGraph>(graph: &G) -> Option<EdgeWeight> {
    contraction_minimum_cut(graph, &MinCutConfig::default(), true).map(|r| r.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, MutableGraph, StaticGraph};

    fn barbell(k: u32, bridges: &[(u32, u32, EdgeWeight)]) -> StaticGraph {
        let mut builder = GraphBuilder::start_construction(2 * k as usize);
        for offset in [0, k] {
            for u in 0..k {
                for v in (u + 1)..k {
                    builder.add_edge(offset + u, offset + v, 1).unwrap();
                }
            }
        }
        for &(u, v, w) in bridges {
            builder.add_edge(u, v, w).unwrap();
        }
        builder.finish_construction()
    }

    #[test]
    fn test_every_algorithm_agrees() {
        let g = barbell(5, &[(0, 5, 1), (1, 6, 1)]);
        for algorithm in [Algorithm::ExactParallel, Algorithm::Sequential, Algorithm::Cactus] {
            let config = MinCutConfig {
                algorithm,
                ..Default::default()
            };
            let solver = select_algorithm::<StaticGraph>(&config).unwrap();
            let result = solver.minimum_cut(&g).unwrap();
            assert_eq!(result.value, 2, "{}", solver.name());
            assert_eq!(result.cut_edges.len(), 2);
            let mut light = result.light().to_vec();
            light.sort_unstable();
            assert!(light == vec![0, 1, 2, 3, 4] || light == vec![5, 6, 7, 8, 9]);
        }
    }

    #[test]
    fn test_save_cut_labels_graph() {
        let mut g = barbell(5, &[(0, 5, 1), (4, 9, 2)]);
        let config = MinCutConfig {
            save_cut: true,
            ..Default::default()
        };
        let solver = ExactMinCut::new(config).unwrap();
        assert_eq!(solver.perform_minimum_cut(&mut g), Some(3));

        let side = g.node_in_cut(0);
        for v in 0..5 {
            assert_eq!(g.node_in_cut(v), side);
            assert_eq!(g.node_in_cut(v + 5), !side);
            assert_eq!(g.partition_index(v), NodeId::from(side));
        }
    }

    #[test]
    fn test_without_save_cut_labels_untouched() {
        let mut g = barbell(3, &[(0, 3, 1)]);
        let solver = SequentialMinCut::new(MinCutConfig::default()).unwrap();
        assert_eq!(solver.perform_minimum_cut(&mut g), Some(1));
        assert!(g.nodes().all(|v| !g.node_in_cut(v)));
    }

    #[test]
    fn test_dedicated_pool() {
        let config = MinCutConfig {
            num_threads: 2,
            ..Default::default()
        };
        let solver = ExactMinCut::new(config).unwrap();
        let g = barbell(6, &[(0, 6, 1)]);
        assert_eq!(MinimumCut::<StaticGraph>::minimum_cut(&solver, &g).unwrap().value, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MinCutConfig {
            depth_of_partial_relabeling: 0,
            ..Default::default()
        };
        assert!(ExactMinCut::new(config).is_err());
    }

    #[test]
    fn test_most_balanced_cut_on_path() {
        // path of 5 unit edges: every edge is a minimum cut
        let g = MutableGraph::from_edge_list(
            6,
            vec![(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 4, 1), (4, 5, 1)],
        );
        let config = MinCutConfig {
            find_most_balanced_cut: true,
            ..Default::default()
        };
        let solver = CactusMinCut::new(config).unwrap();
        let (result, cactus) = solver.minimum_cut_with_cactus(&g).unwrap();
        assert_eq!(result.value, 1);
        assert_eq!(result.imbalance(), 0);
        assert_eq!(cactus.num_minimum_cuts(), 5);
    }

    #[test]
    fn test_minimum_cut_value_helper() {
        let g = barbell(4, &[(0, 4, 3)]);
        assert_eq!(minimum_cut_value(&g), Some(3));
        assert_eq!(minimum_cut_value(&StaticGraph::empty(1)), None);
    }
}
