//! graph-search-core: In-memory graph engine with classic search algorithms.
//!
//! A pure Rust library providing a directed-or-undirected adjacency-list
//! graph addressed by stable handles, breadth-first search, Dijkstra, A*,
//! exhaustive edge-path enumeration, a small tree framework for shortest
//! path trees, and derived utilities (connectivity, diff, path pruning,
//! heuristic directed-ization).
//!
//! Traversals only read the graph they are bound to and keep their scratch
//! state (weight, parent, level) in run-local vertex copies, so any number
//! of runs can share one graph. Wrap a graph in [`SynchronizedGraph`] to
//! mutate it from several threads.

mod adjacency;
mod error;
mod graph;
mod object;
mod sync;
pub mod traversal;
mod tree;
pub mod utils;

pub use adjacency::AdjacencyList;
pub use error::{GraphError, Result};
pub use graph::Graph;
pub use object::{Edge, EdgeId, GraphObject, Vertex, VertexId};
pub use sync::SynchronizedGraph;
pub use traversal::{
    all_paths, shortest_path, zero_heuristic, AStar, AcceptAll, AlgorithmKind, Bfs, BfsConfig,
    Dijkstra, FullTraversal, GraphTraversal, RunInfo, RunSummary, TraversalCallback,
    TraversalElement,
};
pub use tree::{NodeId, PreOrder, Tree};
pub use utils::{
    connected_components, degree_centrality, find_source, find_sources, graph_diff,
    induced_subgraph, is_connected, largest_connected_subgraph, make_directional,
    remove_path_subsets, vertices_not_connected_to_source, DegreeResult, DiffParts, EdgeView,
    GraphDiff,
};
