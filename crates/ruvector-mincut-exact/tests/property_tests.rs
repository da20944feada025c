//! Property tests against a Stoer–Wagner oracle

mod common;

use common::stoer_wagner;
use proptest::prelude::*;
use ruvector_mincut_exact::prelude::*;
use ruvector_mincut_exact::{contract_graph, MinCutCactus};

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId, EdgeWeight)>)> {
    (2usize..14).prop_flat_map(|n| {
        let edge = (0..n as NodeId, 0..n as NodeId, 1..6 as EdgeWeight);
        (Just(n), prop::collection::vec(edge, 1..(3 * n)))
    })
}

fn build(n: usize, edges: &[(NodeId, NodeId, EdgeWeight)]) -> StaticGraph {
    let mut builder = GraphBuilder::start_construction(n);
    for &(u, v, w) in edges {
        builder.add_edge(u, v, w).unwrap();
    }
    builder.finish_construction()
}

#[derive(Debug, Clone)]
enum Op {
    Insert(NodeId, NodeId, EdgeWeight),
    Delete(usize),
}

fn op_strategy(n: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n as NodeId, 0..n as NodeId, 1..4 as EdgeWeight)
            .prop_map(|(u, v, w)| Op::Insert(u, v, w)),
        any::<usize>().prop_map(Op::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exact_cut_matches_oracle((n, edges) in graph_strategy()) {
        let graph = build(n, &edges);
        let solver = ExactMinCut::new(MinCutConfig::default()).unwrap();
        let result = solver.minimum_cut(&graph).unwrap();

        prop_assert_eq!(result.value, stoer_wagner(n, &edges));
        prop_assert_eq!(graph.cut_weight(&result.in_cut), result.value);
        if let Some((_, min_degree)) = graph.min_degree() {
            prop_assert!(result.value <= min_degree);
        }
    }

    #[test]
    fn sequential_and_parallel_agree((n, edges) in graph_strategy(), seed in any::<u64>()) {
        let graph = build(n, &edges);
        let config = MinCutConfig { seed, ..Default::default() };
        let parallel = ExactMinCut::new(config.clone()).unwrap();
        let sequential = SequentialMinCut::new(config).unwrap();

        prop_assert_eq!(
            parallel.minimum_cut(&graph).unwrap().value,
            sequential.minimum_cut(&graph).unwrap().value
        );
    }

    #[test]
    fn contraction_preserves_crossing_weight(
        (n, edges) in graph_strategy(),
        k in 1usize..6,
    ) {
        let graph = build(n, &edges);
        let k = k.min(n);
        let mapping: Vec<NodeId> = (0..n as NodeId).map(|v| v % k as NodeId).collect();
        let contracted = contract_graph(&graph, &mapping, k);

        let expected: EdgeWeight = graph
            .edge_list()
            .into_iter()
            .filter(|&(u, v, _)| mapping[u as usize] != mapping[v as usize])
            .map(|(_, _, w)| w)
            .sum();
        prop_assert_eq!(contracted.n(), k);
        prop_assert_eq!(contracted.total_weight(), expected);
    }

    #[test]
    fn cactus_cuts_are_minimum((n, edges) in graph_strategy()) {
        let graph = build(n, &edges);
        let value = stoer_wagner(n, &edges);
        let cactus = MinCutCactus::build(&graph, value, &MinCutConfig::default());

        prop_assert!(cactus.num_minimum_cuts() >= 1);
        for cut in cactus.minimum_cuts() {
            let side: Vec<bool> = graph.nodes().map(|v| cut.contains(v)).collect();
            prop_assert_eq!(graph.cut_weight(&side), value);
        }
    }

    #[test]
    fn dynamic_matches_oracle(
        (n, edges) in graph_strategy(),
        ops in prop::collection::vec(op_strategy(13), 1..25),
    ) {
        let mut mincut = MinCutBuilder::new()
            .with_vertices(n)
            .with_edges(edges)
            .build()
            .unwrap();

        for op in ops {
            let before = mincut.current_cut();
            match op {
                Op::Insert(u, v, w) => {
                    let (u, v) = (u % n as NodeId, v % n as NodeId);
                    let after = mincut.add_edge(u, v, w).unwrap();
                    prop_assert!(after >= before);
                }
                Op::Delete(index) => {
                    let present = mincut.graph().edge_list();
                    if present.is_empty() {
                        continue;
                    }
                    let (u, v, _) = present[index % present.len()];
                    let after = mincut.remove_edge(u, v).unwrap();
                    prop_assert!(after <= before);
                }
            }
            let expected = stoer_wagner(n, &mincut.graph().edge_list());
            prop_assert_eq!(mincut.current_cut(), expected);
        }
    }
}
