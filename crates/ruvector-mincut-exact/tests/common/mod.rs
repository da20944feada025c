//! Shared helpers for integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ruvector_mincut_exact::{EdgeWeight, NodeId};

/// Minimum cut by Stoer–Wagner on a dense matrix
pub fn stoer_wagner(n: usize, edges: &[(NodeId, NodeId, EdgeWeight)]) -> EdgeWeight {
    if n < 2 {
        return 0;
    }
    let mut w = vec![vec![0 as EdgeWeight; n]; n];
    for &(u, v, c) in edges {
        let (u, v) = (u as usize, v as usize);
        if u != v {
            w[u][v] += c;
            w[v][u] += c;
        }
    }

    let mut active: Vec<usize> = (0..n).collect();
    let mut best = EdgeWeight::MAX;
    while active.len() > 1 {
        let mut key = vec![0 as EdgeWeight; n];
        let mut added = vec![false; n];
        let mut prev = active[0];
        for i in 0..active.len() {
            let next = active
                .iter()
                .copied()
                .filter(|&v| !added[v])
                .max_by_key(|&v| key[v])
                .unwrap();
            added[next] = true;
            if i + 1 == active.len() {
                best = best.min(key[next]);
                for &v in &active {
                    if v != prev && v != next {
                        w[prev][v] += w[next][v];
                        w[v][prev] = w[prev][v];
                    }
                }
                active.retain(|&v| v != next);
            } else {
                prev = next;
                for &v in &active {
                    if !added[v] {
                        key[v] += w[next][v];
                    }
                }
            }
        }
    }
    best
}

/// Two unit-weight cliques of `k` vertices each, joined by `bridges`
pub fn two_cliques(
    k: NodeId,
    bridges: &[(NodeId, NodeId, EdgeWeight)],
) -> Vec<(NodeId, NodeId, EdgeWeight)> {
    let mut edges = Vec::new();
    for offset in [0, k] {
        for u in 0..k {
            for v in (u + 1)..k {
                edges.push((offset + u, offset + v, 1));
            }
        }
    }
    edges.extend_from_slice(bridges);
    edges
}

/// Random weighted graph with a Hamiltonian path backbone, so it is connected
pub fn random_connected(
    n: usize,
    extra: usize,
    max_weight: EdgeWeight,
    seed: u64,
) -> Vec<(NodeId, NodeId, EdgeWeight)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges: Vec<_> = (1..n as NodeId)
        .map(|v| (v - 1, v, rng.gen_range(1..=max_weight)))
        .collect();
    for _ in 0..extra {
        let u = rng.gen_range(0..n as NodeId);
        let v = rng.gen_range(0..n as NodeId);
        if u != v {
            edges.push((u.min(v), u.max(v), rng.gen_range(1..=max_weight)));
        }
    }
    edges
}
