//! Graph contraction engine
//!
//! Collapses every cluster of a vertex → cluster mapping into one node.
//! Weights between two clusters are summed and weights inside a cluster are
//! dropped, so the total inter-cluster weight is preserved exactly.
//!
//! Two strategies are available:
//!
//! - **Full mesh** for few clusters: a dense `k × (k - 1)` accumulator per
//!   worker, merged under a lock, non-zero entries emitted.
//! - **Sparse** for many clusters: a concurrent [`DashMap`] keyed by the
//!   packed cluster pair. One dominating pair (the "contested edge") gets its
//!   own atomic accumulator so workers do not pile up on one map shard.
//!
//! Contraction either copies ([`contract_graph`], input untouched) or works
//! in place on a [`MutableGraph`] ([`contract_in_place`]).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{EdgeWeight, MinCutGraph, MutableGraph, NodeId};
use crate::union_find::UnionFind;

/// Graphs below this size never special-case a contested pair
const CONTESTED_MIN_NODES: usize = 100;

/// How the contracted edge set is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractionStrategy {
    /// Dense per-worker accumulator matrix
    FullMesh,
    /// Concurrent hash aggregation
    Sparse,
}

impl ContractionStrategy {
    /// Dense when the cluster count is at most `sqrt(n)`
    pub fn choose(n: usize, num_clusters: usize) -> Self {
        if (num_clusters as f64) > (n as f64).sqrt() {
            ContractionStrategy::Sparse
        } else {
            ContractionStrategy::FullMesh
        }
    }
}

/// Dense cluster ids and member lists of a capforest
pub fn from_union_find(uf: UnionFind) -> (Vec<NodeId>, Vec<Vec<NodeId>>) {
    uf.into_mapping()
}

/// Contract `graph` into a new graph with `num_clusters` nodes
pub fn contract_graph<G: MinCutGraph>(graph: &G, mapping: &[NodeId], num_clusters: usize) -> G {
    debug_assert_eq!(mapping.len(), graph.n());
    let strategy = ContractionStrategy::choose(graph.n(), num_clusters);
    debug!(
        n = graph.n(),
        m = graph.m(),
        clusters = num_clusters,
        ?strategy,
        "contracting graph"
    );
    match strategy {
        ContractionStrategy::FullMesh => contract_full_mesh(graph, mapping, num_clusters),
        ContractionStrategy::Sparse => contract_sparse(graph, mapping, num_clusters),
    }
}

/// Contract `graph` according to a capforest, returning the new graph and
/// the vertex → node mapping
pub fn contract_by_forest<G: MinCutGraph>(graph: &G, uf: UnionFind) -> (G, Vec<NodeId>) {
    let (mapping, reverse) = from_union_find(uf);
    let contracted = contract_graph(graph, &mapping, reverse.len());
    (contracted, mapping)
}

/// Contract a mutable graph in place, merging contained-vertex sets
pub fn contract_in_place(graph: &mut MutableGraph, mapping: &[NodeId], num_clusters: usize) {
    debug!(
        n = graph.n(),
        clusters = num_clusters,
        "contracting graph in place"
    );
    graph.contract_clusters(mapping, num_clusters);
}

#[inline]
fn mesh_index(src: usize, tgt: usize, k: usize) -> usize {
    src * (k - 1) + tgt - usize::from(tgt > src)
}

/// Dense contraction for a small number of clusters
pub fn contract_full_mesh<G: MinCutGraph>(graph: &G, mapping: &[NodeId], num_clusters: usize) -> G {
    let k = num_clusters;
    if k <= 1 {
        return G::from_parts(k, &vec![0; k], Vec::new());
    }

    let size = k * (k - 1);
    let chunk = graph.n().div_ceil(rayon::current_num_threads()).max(1);
    let merged = Mutex::new(vec![0 as EdgeWeight; size]);

    graph
        .nodes()
        .into_par_iter()
        .with_min_len(chunk)
        .fold(
            || vec![0 as EdgeWeight; size],
            |mut local, v| {
                let src = mapping[v as usize] as usize;
                for e in graph.neighbors(v) {
                    let tgt = mapping[e.target as usize] as usize;
                    if src < tgt {
                        local[mesh_index(src, tgt, k)] += e.weight;
                    }
                }
                local
            },
        )
        .for_each(|local| {
            let mut merged = merged.lock();
            for (total, w) in merged.iter_mut().zip(local) {
                *total += w;
            }
        });

    let weights = merged.into_inner();
    let mut degrees = vec![0usize; k];
    let mut edges = Vec::new();
    for src in 0..k {
        for tgt in (src + 1)..k {
            let w = weights[mesh_index(src, tgt, k)];
            if w > 0 {
                degrees[src] += 1;
                degrees[tgt] += 1;
                edges.push((src as NodeId, tgt as NodeId, w));
            }
        }
    }

    G::from_parts(k, &degrees, edges)
}

#[inline]
fn pair_key(a: NodeId, b: NodeId) -> u64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (u64::from(lo) << 32) | u64::from(hi)
}

#[inline]
fn unpack_key(key: u64) -> (NodeId, NodeId) {
    ((key >> 32) as NodeId, (key & 0xFFFF_FFFF) as NodeId)
}

/// The cluster pair expected to carry most contracted edges, if any.
///
/// Only graphs above a minimum size qualify, and only when the second
/// largest cluster holds more than a fifth of all vertices.
pub fn contested_pair(n: usize, mapping: &[NodeId], num_clusters: usize) -> Option<(NodeId, NodeId)> {
    if n <= CONTESTED_MIN_NODES || num_clusters < 2 {
        return None;
    }
    let mut sizes = vec![0usize; num_clusters];
    for &c in mapping {
        sizes[c as usize] += 1;
    }

    let mut first = (0usize, 0 as NodeId);
    let mut second = (0usize, 0 as NodeId);
    for (c, &size) in sizes.iter().enumerate() {
        if size > first.0 {
            second = first;
            first = (size, c as NodeId);
        } else if size > second.0 {
            second = (size, c as NodeId);
        }
    }

    (second.0 > n / 5).then(|| (first.1.min(second.1), first.1.max(second.1)))
}

/// Hash-aggregated contraction for many clusters
pub fn contract_sparse<G: MinCutGraph>(graph: &G, mapping: &[NodeId], num_clusters: usize) -> G {
    let k = num_clusters;
    let contested = contested_pair(graph.n(), mapping, k);
    let contested_key = contested.map(|(a, b)| pair_key(a, b));

    let contested_weight = AtomicU64::new(0);
    let degrees: Vec<AtomicUsize> = (0..k).map(|_| AtomicUsize::new(0)).collect();
    let aggregated: DashMap<u64, EdgeWeight> = DashMap::with_capacity(graph.m().min(k * 8));

    graph.nodes().into_par_iter().for_each(|v| {
        let src = mapping[v as usize];
        for e in graph.neighbors(v) {
            let tgt = mapping[e.target as usize];
            if src >= tgt {
                continue;
            }
            let key = pair_key(src, tgt);
            if Some(key) == contested_key {
                contested_weight.fetch_add(e.weight, Ordering::AcqRel);
                continue;
            }
            match aggregated.entry(key) {
                Entry::Occupied(mut slot) => *slot.get_mut() += e.weight,
                Entry::Vacant(slot) => {
                    slot.insert(e.weight);
                    degrees[src as usize].fetch_add(1, Ordering::Relaxed);
                    degrees[tgt as usize].fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    });

    let mut degrees: Vec<usize> = degrees.into_iter().map(AtomicUsize::into_inner).collect();
    let mut edges: Vec<(NodeId, NodeId, EdgeWeight)> = aggregated
        .into_iter()
        .map(|(key, w)| {
            let (a, b) = unpack_key(key);
            (a, b, w)
        })
        .collect();

    let contested_weight = contested_weight.into_inner();
    if let Some((a, b)) = contested.filter(|_| contested_weight > 0) {
        degrees[a as usize] += 1;
        degrees[b as usize] += 1;
        edges.push((a, b, contested_weight));
    }

    G::from_parts(k, &degrees, edges)
}
