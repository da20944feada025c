//! Recursive minimum cut extraction
//!
//! Repeatedly cut the graph at all of its minimum cuts and continue inside
//! the largest cactus node, keeping the largest connected component of the
//! induced subgraph. The sequence of cut values describes how the graph's
//! densest core emerges.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MinCutCactus;
use crate::algorithm::contraction_minimum_cut;
use crate::config::MinCutConfig;
use crate::graph::{extract_block, largest_component, EdgeWeight, MinCutGraph, NodeId};

/// One level of the recursion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveStep {
    /// Vertices of the graph at this level
    pub num_vertices: usize,
    /// Edges of the graph at this level
    pub num_edges: usize,
    /// Its minimum cut value
    pub cut: EdgeWeight,
    /// Number of distinct minimum cuts
    pub num_cuts: usize,
    /// Original ids of the vertices at this level
    pub vertices: Vec<NodeId>,
}

/// Driver for recursive cut extraction
#[derive(Debug, Clone)]
pub struct RecursiveMinCut {
    config: MinCutConfig,
    min_size: usize,
}

impl RecursiveMinCut {
    /// Stop once a level has at most `min_size` vertices
    pub fn new(config: MinCutConfig, min_size: usize) -> Self {
        Self {
            config,
            min_size: min_size.max(2),
        }
    }

    /// Run the recursion on `graph`
    pub fn run<G: MinCutGraph>(&self, graph: &G) -> Vec<RecursiveStep> {
        let mut steps = Vec::new();
        let (mut current, mut ids) = largest_component(graph);

        while current.n() > self.min_size {
            let Some(result) = contraction_minimum_cut(&current, &self.config, true) else {
                break;
            };
            let cactus = MinCutCactus::build(&current, result.value, &self.config);
            steps.push(RecursiveStep {
                num_vertices: current.n(),
                num_edges: current.m(),
                cut: result.value,
                num_cuts: cactus.num_minimum_cuts(),
                vertices: ids.clone(),
            });

            let Some(largest) = (0..cactus.num_nodes() as NodeId)
                .max_by_key(|&c| cactus.contained_vertices(c).len())
            else {
                break;
            };
            let mut block: Vec<NodeId> = cactus.contained_vertices(largest).to_vec();
            if block.len() == current.n() {
                break;
            }
            block.sort_unstable();

            let (induced, induced_ids) = extract_block(&current, &block);
            let (component, component_ids) = largest_component(&induced);
            ids = component_ids
                .iter()
                .map(|&v| ids[induced_ids[v as usize] as usize])
                .collect();
            current = component;
            debug!(n = current.n(), cut = result.value, "recursing into largest block");
        }

        steps
    }
}
