use crate::object::VertexId;

/// Errors raised by graph mutation and traversal.
///
/// Caller mistakes (dangling handles, sources outside the graph) are
/// rejected immediately. `UnreachableTarget` is the one expected domain
/// failure: A* reports it when its open set drains before the target is
/// extracted. Absent results (no edge, unvisited destination) are
/// `None`/empty, never errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex handle that does not name a live vertex of the graph.
    #[error("vertex {0} is not in the graph")]
    VertexNotFound(VertexId),

    /// An edge whose endpoint is absent from the graph.
    #[error("edge endpoint {0} is not in the graph")]
    EdgeEndpointMissing(VertexId),

    /// A traversal bound to a source (or target) outside the graph.
    #[error("traversal vertex {0} is not in the graph")]
    SourceNotInGraph(VertexId),

    /// An operation defined only on directed graphs was given an undirected one.
    #[error("operation requires a directed graph")]
    RequiresDirected,

    /// A* exhausted its open set without reaching the target.
    #[error("target {target} is unreachable from {start}")]
    UnreachableTarget { start: VertexId, target: VertexId },
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
