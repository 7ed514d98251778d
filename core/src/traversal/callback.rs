//! Observer protocol for traversal runs.

use std::fmt;

use crate::object::{Edge, GraphObject, Vertex, VertexId};

/// Which algorithm produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Bfs,
    Dijkstra,
    AStar,
    Full,
}

impl AlgorithmKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::Bfs => "bfs",
            AlgorithmKind::Dijkstra => "dijkstra",
            AlgorithmKind::AStar => "astar",
            AlgorithmKind::Full => "full",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passed to [`TraversalCallback::on_begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunInfo {
    pub algorithm: AlgorithmKind,
    pub source: VertexId,
    /// Fixed target, for algorithms that have one.
    pub target: Option<VertexId>,
}

/// Passed to [`TraversalCallback::on_finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub algorithm: AlgorithmKind,
    pub source: VertexId,
    /// Vertices included in the traversal result.
    pub visited: usize,
    /// True when a callback returned false and the run stopped before
    /// exhausting its frontier.
    pub stopped_early: bool,
}

/// One step of a traversal: a vertex being visited and the edge it was
/// reached through (`None` for the source).
///
/// `vertex` is the run-local copy, so its weight, parent and level describe
/// this run, not the vertex stored in the graph.
#[derive(Debug)]
pub struct TraversalElement<'a, V, E> {
    pub id: VertexId,
    pub vertex: &'a Vertex<V>,
    pub edge: Option<&'a Edge<E>>,
}

impl<V, E> TraversalElement<'_, V, E> {
    pub fn level(&self) -> i32 {
        self.vertex.level()
    }

    /// Accumulated cost of the step (hop-weighted for BFS).
    pub fn weight(&self) -> f32 {
        self.vertex.weight()
    }

    pub fn parent(&self) -> Option<VertexId> {
        self.vertex.parent()
    }

    pub fn payload(&self) -> Option<&V> {
        self.vertex.payload()
    }
}

/// Observes and steers a traversal.
///
/// `on_begin` fires once before the first element, `on_traverse` once per
/// visited element, and `on_finish` once at the end, early stops included.
/// Returning false from `on_traverse` excludes the element from the result;
/// whether that also prunes the branch or stops the whole run depends on the
/// algorithm.
///
/// Any `FnMut(&TraversalElement) -> bool` closure is a callback that only
/// implements `on_traverse`.
pub trait TraversalCallback<V, E> {
    fn on_begin(&mut self, _run: &RunInfo) {}

    fn on_traverse(&mut self, _element: &TraversalElement<'_, V, E>) -> bool {
        true
    }

    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// The default callback: accepts everything, observes nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl<V, E> TraversalCallback<V, E> for AcceptAll {}

impl<V, E, F> TraversalCallback<V, E> for F
where
    F: FnMut(&TraversalElement<'_, V, E>) -> bool,
{
    fn on_traverse(&mut self, element: &TraversalElement<'_, V, E>) -> bool {
        self(element)
    }
}
