//! Contraction driver shared by the exact solvers

use std::borrow::Cow;
use std::time::Instant;

use tracing::{debug, info};

use super::MinCutResult;
use crate::capforest::{parallel_capforest, sequential_capforest};
use crate::config::MinCutConfig;
use crate::contraction::contract_by_forest;
use crate::graph::{connected_components, EdgeWeight, MinCutGraph, NodeId};

/// Where the best cut so far was seen: a node at some contraction level
#[derive(Debug, Clone, Copy)]
struct BestCut {
    level: usize,
    node: NodeId,
    value: EdgeWeight,
}

/// Run capforest/contraction rounds until at most two nodes remain or the
/// bound reaches zero, then rebuild the bipartition of `graph`.
pub(crate) fn contraction_minimum_cut<G: MinCutGraph>(
    graph: &G,
    config: &MinCutConfig,
    parallel: bool,
) -> Option<MinCutResult> {
    let n = graph.n();
    if n < 2 {
        return None;
    }
    let start = Instant::now();

    let components = connected_components(graph);
    if components.len() > 1 {
        let mut in_cut = vec![false; n];
        for &v in &components[0] {
            in_cut[v as usize] = true;
        }
        debug!(components = components.len(), "graph is disconnected");
        return Some(MinCutResult::from_side(graph, 0, in_cut, 0));
    }

    let (vertex, degree) = graph.min_degree()?;
    let mut best = BestCut {
        level: 0,
        node: vertex,
        value: degree,
    };
    let mut mappings: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Cow<'_, G> = Cow::Borrowed(graph);
    let mut round = 0u64;

    while current.n() > 2 && best.value > 0 {
        let bound = best.value;
        let (mut uf, _) = if parallel {
            parallel_capforest(&*current, bound, config, round)
        } else {
            sequential_capforest(&*current, bound, config.queue_type)
        };

        if parallel && uf.size() == current.n() {
            debug!(round, n = current.n(), "parallel capforest stalled, running sequential");
            uf = sequential_capforest(&*current, bound, config.queue_type).0;
        }

        debug_assert!(
            uf.size() < current.n(),
            "capforest made no progress on a connected graph"
        );
        // a single set means every pair is at least `bound`-connected
        if uf.size() == current.n() || uf.size() == 1 {
            break;
        }

        let (next, mapping) = contract_by_forest(&*current, uf);
        mappings.push(mapping);
        current = Cow::Owned(next);
        round += 1;

        if let Some((v, d)) = current.min_degree() {
            if d < best.value {
                best = BestCut {
                    level: mappings.len(),
                    node: v,
                    value: d,
                };
            }
        }
        debug!(round, n = current.n(), m = current.m(), bound = best.value, "contraction round");
    }

    let in_cut = reconstruct_side(n, &mappings[..best.level], best.node);
    let result = MinCutResult::from_side(graph, best.value, in_cut, mappings.len());
    info!(
        n,
        m = graph.m(),
        cut = result.value,
        rounds = result.rounds,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "minimum cut computed"
    );
    Some(result)
}

/// Map every original vertex through `mappings` and flag those landing on
/// `node`
fn reconstruct_side(n: usize, mappings: &[Vec<NodeId>], node: NodeId) -> Vec<bool> {
    (0..n as NodeId)
        .map(|v| mappings.iter().fold(v, |x, mapping| mapping[x as usize]) == node)
        .collect()
}
