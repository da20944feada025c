//! Capforest sparsification
//!
//! A bounded maximum-adjacency scan assigns every vertex `t` the weight
//! `r(t)` of already-scanned edges into it, capped at the cut bound. When
//! scanning the edge `(v, t)` lifts `r(t)` to the bound, `v` and `t` are
//! connected by at least `bound` edge-disjoint paths, so no cut below the
//! bound separates them and they may be merged.
//!
//! [`parallel_capforest`] runs one scan per worker from random start
//! vertices. Workers share a `visited` flag array written with relaxed
//! atomics: a vertex scanned by one worker is skipped (and blacklisted) by
//! every other worker that extracts it later. A worker never merges a vertex
//! it has blacklisted, because its `r` value no longer describes a
//! maximum-adjacency order. Races on the shared flags can only make a worker
//! skip work or scan a vertex twice; both orders remain valid, so a lost race
//! costs sparsification, never soundness.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::MinCutConfig;
use crate::frontier::{Frontier, QueueType};
use crate::graph::{EdgeWeight, MinCutGraph, NodeId};
use crate::union_find::UnionFind;

/// Counters of one capforest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapforestStats {
    /// Workers that took part
    pub workers: usize,
    /// Vertices whose edges were scanned (summed over workers)
    pub scanned: usize,
    /// Extracted vertices skipped because another worker scanned them
    pub skipped: usize,
}

/// Parallel modified capforest with bound `mincut`.
///
/// Every set of the returned forest is inseparable by cuts below `mincut`.
/// `round` perturbs the start vertices between calls.
pub fn parallel_capforest<G: MinCutGraph>(
    graph: &G,
    mincut: EdgeWeight,
    config: &MinCutConfig,
    round: u64,
) -> (UnionFind, CapforestStats) {
    let n = graph.n();
    let uf = UnionFind::new(n);
    if n == 0 || mincut == 0 {
        return (uf, CapforestStats::default());
    }

    let workers = rayon::current_num_threads().min(n).max(1);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(round));
    let starts: Vec<NodeId> = (0..workers).map(|_| rng.gen_range(0..n as NodeId)).collect();

    let visited: Vec<AtomicBool> = (0..n).map(|_| AtomicBool::new(false)).collect();
    let scanned = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let use_blacklist = !config.disable_blacklist;

    starts.par_iter().for_each(|&start| {
        let mut frontier = Frontier::new(config.queue_type, n, mincut);
        let mut r_v: Vec<EdgeWeight> = vec![0; n];
        let mut local_visited = vec![false; n];
        let mut blacklisted = vec![false; n];
        let mut local_scanned = 0usize;
        let mut local_skipped = 0usize;

        frontier.insert(start, 0);

        while let Some(current) = frontier.delete_max() {
            local_visited[current as usize] = true;

            if use_blacklist && visited[current as usize].swap(true, Ordering::Relaxed) {
                blacklisted[current as usize] = true;
                local_skipped += 1;
                continue;
            }
            local_scanned += 1;

            for e in graph.neighbors(current) {
                let t = e.target as usize;
                if local_visited[t] || r_v[t] >= mincut {
                    continue;
                }
                if r_v[t] + e.weight >= mincut && !blacklisted[t] {
                    uf.union(current, e.target);
                }
                if !use_blacklist || !visited[t].load(Ordering::Relaxed) {
                    r_v[t] = (r_v[t] + e.weight).min(mincut);
                    frontier.push_or_raise(e.target, r_v[t]);
                }
            }
        }

        scanned.fetch_add(local_scanned, Ordering::Relaxed);
        skipped.fetch_add(local_skipped, Ordering::Relaxed);
    });

    let stats = CapforestStats {
        workers,
        scanned: scanned.into_inner(),
        skipped: skipped.into_inner(),
    };
    trace!(
        n,
        mincut,
        clusters = uf.size(),
        scanned = stats.scanned,
        skipped = stats.skipped,
        "parallel capforest"
    );
    (uf, stats)
}

/// Single-threaded capforest with bound `mincut`.
///
/// The scan restarts from every unvisited vertex, so each connected
/// component gets a full maximum-adjacency order. On a connected graph whose
/// minimum degree is at least `mincut` this always merges at least one pair.
pub fn sequential_capforest<G: MinCutGraph>(
    graph: &G,
    mincut: EdgeWeight,
    queue_type: QueueType,
) -> (UnionFind, CapforestStats) {
    let n = graph.n();
    let uf = UnionFind::new(n);
    if n == 0 || mincut == 0 {
        return (uf, CapforestStats::default());
    }

    let mut frontier = Frontier::new(queue_type, n, mincut);
    let mut r_v: Vec<EdgeWeight> = vec![0; n];
    let mut visited = vec![false; n];
    let mut scanned = 0usize;

    for start in graph.nodes() {
        if visited[start as usize] {
            continue;
        }
        frontier.insert(start, 0);

        while let Some(current) = frontier.delete_max() {
            visited[current as usize] = true;
            scanned += 1;

            for e in graph.neighbors(current) {
                let t = e.target as usize;
                if visited[t] || r_v[t] >= mincut {
                    continue;
                }
                if r_v[t] + e.weight >= mincut {
                    uf.union(current, e.target);
                }
                r_v[t] = (r_v[t] + e.weight).min(mincut);
                frontier.push_or_raise(e.target, r_v[t]);
            }
        }
    }

    trace!(n, mincut, clusters = uf.size(), "sequential capforest");
    (
        uf,
        CapforestStats {
            workers: 1,
            scanned,
            skipped: 0,
        },
    )
}
