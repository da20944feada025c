//! Maximum flow on undirected graphs
//!
//! [`FlowNetwork`] stores every undirected edge as a pair of opposite arcs
//! sharing the same capacity; arc `i` and arc `i ^ 1` are each other's
//! reverse. Dinic's algorithm computes bounded maximum flows, and the
//! residual network is used to enumerate every minimum `s`-`t` cut as a
//! closed set of its strongly connected components.

mod push_relabel;

pub use push_relabel::bounded_connectivity;

use std::collections::VecDeque;

use crate::graph::{EdgeWeight, MinCutGraph, NodeId};

/// Capacity used for links that must never be cut
pub const INFINITE_CAPACITY: EdgeWeight = EdgeWeight::MAX / 4;

const UNLEVELED: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct FlowArc {
    to: usize,
    capacity: EdgeWeight,
    flow: i64,
}

impl FlowArc {
    #[inline]
    fn residual(&self) -> EdgeWeight {
        (self.capacity as i128 - self.flow as i128) as EdgeWeight
    }
}

/// Residual network of an undirected graph
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    adjacency: Vec<Vec<usize>>,
    arcs: Vec<FlowArc>,
}

impl FlowNetwork {
    /// Network with `n` nodes and no arcs
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            arcs: Vec::new(),
        }
    }

    /// One arc pair per undirected edge of `graph`
    pub fn from_graph<G: MinCutGraph>(graph: &G) -> Self {
        let mut network = Self::new(graph.n());
        for (u, v, w) in graph.edge_list() {
            network.add_undirected(u as usize, v as usize, w);
        }
        network
    }

    /// Number of nodes
    pub fn n(&self) -> usize {
        self.adjacency.len()
    }

    /// Add an undirected edge of capacity `capacity`
    pub fn add_undirected(&mut self, u: usize, v: usize, capacity: EdgeWeight) {
        self.add_arc_pair(u, v, capacity, capacity);
    }

    /// Add an arc `u -> v` with a reverse arc of capacity `reverse_capacity`
    pub(crate) fn add_arc_pair(
        &mut self,
        u: usize,
        v: usize,
        capacity: EdgeWeight,
        reverse_capacity: EdgeWeight,
    ) {
        let index = self.arcs.len();
        self.arcs.push(FlowArc {
            to: v,
            capacity,
            flow: 0,
        });
        self.arcs.push(FlowArc {
            to: u,
            capacity: reverse_capacity,
            flow: 0,
        });
        self.adjacency[u].push(index);
        self.adjacency[v].push(index + 1);
    }

    /// Add a node, returning its id
    pub(crate) fn add_node(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    /// Zero every flow value
    pub fn reset_flow(&mut self) {
        for arc in &mut self.arcs {
            arc.flow = 0;
        }
    }

    #[inline]
    fn push_on(&mut self, arc: usize, amount: EdgeWeight) {
        self.arcs[arc].flow += amount as i64;
        self.arcs[arc ^ 1].flow -= amount as i64;
    }

    #[inline]
    fn tail(&self, arc: usize) -> usize {
        self.arcs[arc ^ 1].to
    }

    fn build_levels(&self, s: usize, t: usize, level: &mut [usize]) -> bool {
        level.fill(UNLEVELED);
        level[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(u) = queue.pop_front() {
            for &a in &self.adjacency[u] {
                let arc = self.arcs[a];
                if arc.residual() > 0 && level[arc.to] == UNLEVELED {
                    level[arc.to] = level[u] + 1;
                    queue.push_back(arc.to);
                }
            }
        }
        level[t] != UNLEVELED
    }

    /// Maximum `s`-`t` flow, stopping once `limit` units are routed.
    ///
    /// Flow already in the network is kept; call [`Self::reset_flow`] first
    /// for a fresh computation.
    pub fn max_flow(&mut self, s: usize, t: usize, limit: EdgeWeight) -> EdgeWeight {
        if s == t {
            return limit;
        }
        let n = self.n();
        let mut total: EdgeWeight = 0;
        let mut level = vec![UNLEVELED; n];
        let mut next = vec![0usize; n];
        let mut path: Vec<usize> = Vec::new();

        while total < limit && self.build_levels(s, t, &mut level) {
            next.fill(0);
            path.clear();
            let mut u = s;

            while total < limit {
                if u == t {
                    let bottleneck = path
                        .iter()
                        .map(|&a| self.arcs[a].residual())
                        .min()
                        .unwrap_or(0)
                        .min(limit - total);
                    for &a in &path {
                        self.push_on(a, bottleneck);
                    }
                    total += bottleneck;

                    // resume from the tail of the first saturated arc
                    let cut = path
                        .iter()
                        .position(|&a| self.arcs[a].residual() == 0)
                        .unwrap_or(0);
                    u = self.tail(path[cut]);
                    path.truncate(cut);
                    continue;
                }

                let mut advanced = false;
                while next[u] < self.adjacency[u].len() {
                    let a = self.adjacency[u][next[u]];
                    let arc = self.arcs[a];
                    if arc.residual() > 0 && level[arc.to] == level[u] + 1 {
                        path.push(a);
                        u = arc.to;
                        advanced = true;
                        break;
                    }
                    next[u] += 1;
                }

                if !advanced {
                    if u == s {
                        break;
                    }
                    // dead end, retreat
                    level[u] = UNLEVELED;
                    if let Some(a) = path.pop() {
                        u = self.tail(a);
                        next[u] += 1;
                    }
                }
            }
        }

        total
    }

    /// Nodes reachable from `s` in the residual network
    pub fn residual_reachable(&self, s: usize) -> Vec<bool> {
        let mut seen = vec![false; self.n()];
        let mut stack = vec![s];
        seen[s] = true;
        while let Some(u) = stack.pop() {
            for &a in &self.adjacency[u] {
                let arc = self.arcs[a];
                if arc.residual() > 0 && !seen[arc.to] {
                    seen[arc.to] = true;
                    stack.push(arc.to);
                }
            }
        }
        seen
    }

    /// Strongly connected components of the residual network.
    ///
    /// Returns the component of every node and the component count.
    pub fn residual_components(&self) -> (Vec<usize>, usize) {
        let n = self.n();
        let mut index = vec![UNLEVELED; n];
        let mut low = vec![0usize; n];
        let mut on_stack = vec![false; n];
        let mut component = vec![UNLEVELED; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut call: Vec<(usize, usize)> = Vec::new();
        let mut counter = 0;
        let mut count = 0;

        for root in 0..n {
            if index[root] != UNLEVELED {
                continue;
            }
            call.push((root, 0));
            index[root] = counter;
            low[root] = counter;
            counter += 1;
            stack.push(root);
            on_stack[root] = true;

            while let Some(&(u, cursor)) = call.last() {
                if cursor < self.adjacency[u].len() {
                    let a = self.adjacency[u][cursor];
                    if let Some(top) = call.last_mut() {
                        top.1 += 1;
                    }
                    let arc = self.arcs[a];
                    if arc.residual() == 0 {
                        continue;
                    }
                    let v = arc.to;
                    if index[v] == UNLEVELED {
                        index[v] = counter;
                        low[v] = counter;
                        counter += 1;
                        stack.push(v);
                        on_stack[v] = true;
                        call.push((v, 0));
                    } else if on_stack[v] {
                        low[u] = low[u].min(index[v]);
                    }
                    continue;
                }

                call.pop();
                if let Some(&(parent, _)) = call.last() {
                    low[parent] = low[parent].min(low[u]);
                }
                if low[u] == index[u] {
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component[w] = count;
                        if w == u {
                            break;
                        }
                    }
                    count += 1;
                }
            }
        }

        (component, count)
    }

    /// Every minimum `s`-`t` cut of a network carrying a maximum flow.
    ///
    /// Each cut is returned as its source side. The source sides are exactly
    /// the residual-closed node sets containing `s` but not `t`.
    pub fn enumerate_min_cuts(&self, s: usize, t: usize) -> Vec<Vec<bool>> {
        let n = self.n();
        let (component, count) = self.residual_components();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); count];
        for u in 0..n {
            for &a in &self.adjacency[u] {
                let arc = self.arcs[a];
                let (cu, cv) = (component[u], component[arc.to]);
                if arc.residual() > 0 && cu != cv {
                    successors[cu].push(cv);
                    predecessors[cv].push(cu);
                }
            }
        }

        const FREE: u8 = 0;
        const IN: u8 = 1;
        const OUT: u8 = 2;

        let spread = |state: &mut [u8], from: usize, edges: &[Vec<usize>], mark: u8| {
            let mut stack = vec![from];
            state[from] = mark;
            while let Some(c) = stack.pop() {
                for &d in &edges[c] {
                    if state[d] != mark {
                        debug_assert_eq!(state[d], FREE, "closure crosses a fixed component");
                        state[d] = mark;
                        stack.push(d);
                    }
                }
            }
        };

        let mut initial = vec![FREE; count];
        spread(&mut initial, component[s], &successors, IN);
        if initial[component[t]] == IN {
            return Vec::new();
        }
        spread(&mut initial, component[t], &predecessors, OUT);

        let mut cuts = Vec::new();
        let mut pending = vec![initial];
        while let Some(mut state) = pending.pop() {
            match state.iter().position(|&x| x == FREE) {
                None => {
                    cuts.push((0..n).map(|v| state[component[v]] == IN).collect());
                }
                Some(c) => {
                    let mut include = state.clone();
                    spread(&mut include, c, &successors, IN);
                    pending.push(include);

                    spread(&mut state, c, &predecessors, OUT);
                    pending.push(state);
                }
            }
        }
        cuts
    }
}

/// Every minimum cut of a connected graph with minimum cut `lambda`.
///
/// Each cut is reported once, as the vertex set of the side not containing
/// vertex `0`.
pub fn all_minimum_cuts<G: MinCutGraph>(graph: &G, lambda: EdgeWeight) -> Vec<Vec<NodeId>> {
    let n = graph.n();
    let mut cuts = Vec::new();
    if n < 2 {
        return cuts;
    }

    let mut network = FlowNetwork::from_graph(graph);
    for sink in 1..n {
        // merge the sources 0..sink into vertex 0
        if sink > 1 {
            network.add_undirected(0, sink - 1, INFINITE_CAPACITY);
        }
        network.reset_flow();
        let flow = network.max_flow(0, sink, lambda.saturating_add(1));
        debug_assert!(flow >= lambda, "flow below the global minimum cut");
        if flow != lambda {
            continue;
        }
        for source_side in network.enumerate_min_cuts(0, sink) {
            cuts.push(
                (0..n as NodeId)
                    .filter(|&v| !source_side[v as usize])
                    .collect(),
            );
        }
    }
    cuts
}
