//! Bounded push-relabel connectivity checks
//!
//! Answers "are `s` and `t` still at least `bound`-connected?" without
//! computing the full maximum flow: a virtual source feeds exactly `bound`
//! units into `s`. Global relabelling is partial: the backwards BFS from the
//! sink stops after a fixed number of levels, and every unreached node is
//! lifted to just above that depth, which keeps the labelling valid.

use std::collections::VecDeque;

use tracing::trace;

use super::FlowNetwork;
use crate::graph::{EdgeWeight, MinCutGraph, NodeId};

/// `min(bound, λ(s, t))` by bounded push-relabel.
///
/// `relabel_depth` limits the BFS of every global relabelling.
pub fn bounded_connectivity<G: MinCutGraph>(
    graph: &G,
    s: NodeId,
    t: NodeId,
    bound: EdgeWeight,
    relabel_depth: usize,
) -> EdgeWeight {
    if s == t {
        return bound;
    }
    let mut network = FlowNetwork::from_graph(graph);
    let flow = network.bounded_push_relabel(s as usize, t as usize, bound, relabel_depth);
    trace!(s, t, bound, flow, "bounded connectivity");
    flow
}

impl FlowNetwork {
    /// Preflow phase of FIFO push-relabel with `bound` units at `s`.
    ///
    /// Returns the flow value reaching `t`.
    pub(crate) fn bounded_push_relabel(
        &mut self,
        s: usize,
        t: usize,
        bound: EdgeWeight,
        relabel_depth: usize,
    ) -> EdgeWeight {
        let source = self.add_node();
        let feed = self.arcs.len();
        self.add_arc_pair(source, s, bound, 0);

        let n = self.n();
        let mut label = vec![0usize; n];
        let mut excess = vec![0 as EdgeWeight; n];
        let mut current = vec![0usize; n];
        let mut queued = vec![false; n];
        let mut active = VecDeque::new();

        self.push_on(feed, bound);
        excess[s] = bound;
        label[source] = n;
        self.partial_global_relabel(t, source, relabel_depth, &mut label);

        active.push_back(s);
        queued[s] = true;
        let mut relabels = 0usize;

        while let Some(u) = active.pop_front() {
            queued[u] = false;

            while excess[u] > 0 && label[u] < n {
                if current[u] == self.adjacency[u].len() {
                    let lowest = self.adjacency[u]
                        .iter()
                        .map(|&a| self.arcs[a])
                        .filter(|arc| arc.residual() > 0)
                        .map(|arc| label[arc.to])
                        .min();
                    label[u] = lowest.map_or(n, |l| l + 1);
                    current[u] = 0;

                    relabels += 1;
                    if relabels >= n {
                        relabels = 0;
                        self.partial_global_relabel(t, source, relabel_depth, &mut label);
                        current.fill(0);
                    }
                    continue;
                }

                let a = self.adjacency[u][current[u]];
                let arc = self.arcs[a];
                if arc.residual() > 0 && label[u] == label[arc.to] + 1 {
                    let amount = excess[u].min(arc.residual());
                    self.push_on(a, amount);
                    excess[u] -= amount;
                    excess[arc.to] += amount;
                    if arc.to != t && arc.to != source && !queued[arc.to] {
                        queued[arc.to] = true;
                        active.push_back(arc.to);
                    }
                } else {
                    current[u] += 1;
                }
            }
        }

        excess[t]
    }

    /// Exact BFS distances to `t` for nodes within `depth` levels; every
    /// other node is raised to at least `depth + 1`
    fn partial_global_relabel(&self, t: usize, source: usize, depth: usize, label: &mut [usize]) {
        let n = self.n();
        let mut reached = vec![false; n];
        let mut queue = VecDeque::new();

        label[t] = 0;
        reached[t] = true;
        reached[source] = true;
        queue.push_back(t);

        while let Some(w) = queue.pop_front() {
            if label[w] >= depth {
                continue;
            }
            for &a in &self.adjacency[w] {
                let x = self.arcs[a].to;
                // x can push to w through the reverse arc
                if !reached[x] && self.arcs[a ^ 1].residual() > 0 {
                    reached[x] = true;
                    label[x] = label[w] + 1;
                    queue.push_back(x);
                }
            }
        }

        for (v, l) in label.iter_mut().enumerate() {
            if !reached[v] {
                *l = (*l).max(depth + 1);
            }
        }
    }
}
