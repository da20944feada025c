//! # RuVector MinCut Exact
//!
//! Exact parallel global minimum cut, the cactus of all minimum cuts, and
//! fully dynamic minimum cut maintenance for undirected graphs with positive
//! integer edge weights.
//!
//! ## Features
//!
//! - **Exact Algorithm**: capforest rounds contract every edge proven to lie
//!   in no cut lighter than the best one found, in parallel with rayon
//! - **Cactus**: every minimum cut of a graph, as vertex bitmaps over a
//!   contracted quotient graph
//! - **Dynamic**: edge insertions and deletions answered from the cactus,
//!   falling back to the static algorithm only when needed
//! - **Thread-Safe**: lock-free union-find and concurrent contraction
//!
//! ## Quick Start
//!
//! ```rust
//! use ruvector_mincut_exact::prelude::*;
//!
//! // two triangles joined by one edge
//! let mut builder = GraphBuilder::start_construction(6);
//! for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)] {
//!     builder.add_edge(u, v, 1).unwrap();
//! }
//! let graph = builder.finish_construction();
//!
//! let solver = ExactMinCut::new(MinCutConfig::default()).unwrap();
//! let result = solver.minimum_cut(&graph).unwrap();
//! assert_eq!(result.value, 1);
//! ```
//!
//! ## Architecture
//!
//! - [`graph`]: the [`MinCutGraph`] trait with static and mutable backends
//! - [`union_find`]: concurrent union-find over vertex ids
//! - [`frontier`]: bucket and heap priority queues for graph scans
//! - [`capforest`]: bounded maximum-adjacency scans marking contractible edges
//! - [`contraction`]: quotient graph construction
//! - [`algorithm`]: static minimum cut solvers
//! - [`flow`]: max-flow, minimum cut enumeration and bounded connectivity
//! - [`cactus`]: the cactus of all minimum cuts
//! - [`dynamic`]: minimum cut under edge updates
//! - [`kcore`]: k-core decomposition
//!
//! ## Dynamic Usage
//!
//! ```rust
//! use ruvector_mincut_exact::prelude::*;
//!
//! let mut mincut = MinCutBuilder::new()
//!     .with_edges(vec![(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)])
//!     .build()
//!     .unwrap();
//! assert_eq!(mincut.current_cut(), 2);
//!
//! mincut.add_edge(0, 2, 1).unwrap();
//! assert_eq!(mincut.current_cut(), 2);
//!
//! mincut.remove_edge(0, 1).unwrap();
//! assert_eq!(mincut.current_cut(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod algorithm;
pub mod cactus;
pub mod capforest;
pub mod config;
pub mod contraction;
pub mod dynamic;
pub mod error;
pub mod flow;
pub mod frontier;
pub mod graph;
pub mod kcore;
pub mod union_find;

// Re-exports for convenient access
pub use algorithm::{
    label_graph, minimum_cut_value, select_algorithm, CactusMinCut, ExactMinCut, MinCutResult,
    MinimumCut, SequentialMinCut,
};
pub use cactus::{CactusBuilder, MinCutCactus, RecursiveMinCut, RecursiveStep};
pub use capforest::{parallel_capforest, sequential_capforest, CapforestStats};
pub use config::{Algorithm, MinCutConfig};
pub use contraction::{contract_graph, contract_in_place, ContractionStrategy};
pub use dynamic::{BatchOutcome, DynamicMinCut, DynamicStats, EdgeUpdate, MinCutBuilder};
pub use error::{MinCutError, Result};
pub use flow::{all_minimum_cuts, bounded_connectivity, FlowNetwork};
pub use frontier::{Frontier, QueueType};
pub use graph::{
    connected_components, EdgeWeight, GraphBuilder, GraphStats, MinCutGraph, MutableGraph,
    Neighbor, NodeId, StaticGraph,
};
pub use kcore::{CoreCut, CoreDecomposition};
pub use union_find::UnionFind;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports
///
/// ```rust
/// use ruvector_mincut_exact::prelude::*;
///
/// let graph = StaticGraph::from_edge_list(3, vec![(0, 1, 2), (1, 2, 3)]);
/// assert_eq!(minimum_cut_value(&graph), Some(2));
/// ```
pub mod prelude {
    //! Prelude module with commonly used types

    pub use crate::{
        minimum_cut_value, select_algorithm, Algorithm, BatchOutcome, CactusMinCut,
        CoreDecomposition, DynamicMinCut, DynamicStats, EdgeUpdate, EdgeWeight, ExactMinCut,
        GraphBuilder, MinCutBuilder, MinCutCactus, MinCutConfig, MinCutError, MinCutGraph,
        MinCutResult, MinimumCut, MutableGraph, NodeId, QueueType, Result, SequentialMinCut,
        StaticGraph,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "ruvector-mincut-exact");
    }

    #[test]
    fn test_basic_workflow() {
        let mut mincut = MinCutBuilder::new()
            .with_edges(vec![(0, 1, 1), (1, 2, 1), (2, 0, 1)])
            .build()
            .unwrap();

        assert_eq!(mincut.num_vertices(), 3);
        assert_eq!(mincut.num_edges(), 3);
        assert_eq!(mincut.current_cut(), 2);

        assert_eq!(mincut.add_edge(0, 3, 2).unwrap(), 2);
        assert_eq!(mincut.num_edges(), 4);

        assert_eq!(mincut.remove_edge(1, 2).unwrap(), 1);
        assert_eq!(mincut.num_edges(), 3);
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let result = MinCutBuilder::new().build();
        assert!(matches!(result, Err(MinCutError::EmptyGraph)));
    }

    #[test]
    fn test_selected_solvers_agree() {
        let graph = StaticGraph::from_edge_list(
            5,
            vec![(0, 1, 3), (1, 2, 3), (2, 3, 1), (3, 4, 3), (4, 0, 1)],
        );
        for algorithm in [Algorithm::ExactParallel, Algorithm::Sequential, Algorithm::Cactus] {
            let config = MinCutConfig {
                algorithm,
                ..Default::default()
            };
            let solver = select_algorithm::<StaticGraph>(&config).unwrap();
            assert_eq!(solver.minimum_cut(&graph).unwrap().value, 2, "{}", solver.name());
        }
    }
}
