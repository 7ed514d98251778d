//! Graph traversals: breadth-first, Dijkstra, A* and exhaustive edge walks.
//!
//! Every algorithm binds to one graph and one source vertex, and works on
//! run-local copies of the vertices it touches. The graph itself is only
//! read, so a traversal never disturbs a concurrent traversal of the same
//! graph, and the annotated copies (weight, parent, level) stay available
//! after the run through [`GraphTraversal::visited_vertex`].

mod astar;
mod bfs;
pub mod callback;
mod dijkstra;
mod full;

use std::cmp::Ordering;
use std::collections::BTreeSet;

pub use astar::{zero_heuristic, AStar};
pub use bfs::{Bfs, BfsConfig};
pub use callback::{
    AcceptAll, AlgorithmKind, RunInfo, RunSummary, TraversalCallback, TraversalElement,
};
pub use dijkstra::Dijkstra;
pub use full::FullTraversal;

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{cmp_weight, Edge, Vertex, VertexId};

/// Common surface of every traversal algorithm.
pub trait GraphTraversal {
    type VertexData;

    fn kind(&self) -> AlgorithmKind;

    fn source(&self) -> VertexId;

    /// Run the algorithm from scratch. Results of a previous run are
    /// discarded first, so executing twice yields the same results.
    fn execute(&mut self) -> Result<()>;

    /// Visited vertices in the order the algorithm settled them.
    fn traversal(&self) -> &[VertexId];

    /// Vertices from the source to `dest` following parent links.
    ///
    /// Empty when `dest` was not reached. Fails if `dest` is not in the
    /// graph at all.
    fn path(&self, dest: VertexId) -> Result<Vec<VertexId>>;

    /// The run-local copy of a visited vertex, carrying this run's weight,
    /// parent and level.
    fn visited_vertex(&self, id: VertexId) -> Option<&Vertex<Self::VertexData>>;

    fn is_visited(&self, id: VertexId) -> bool {
        self.visited_vertex(id).is_some()
    }
}

/// Per-run state shared by all algorithms.
///
/// Vertices are copied out of the graph the first time a run touches them,
/// with their scratch fields reset. The sentinel weight is large enough to
/// stand for "unreached" without overflowing when an edge weight is added.
pub(crate) struct TraversalBase<'g, G: Graph> {
    graph: &'g G,
    source: VertexId,
    sentinel: f32,
    local: Vec<Option<Vertex<G::VertexData>>>,
    via: Vec<Option<&'g Edge<G::EdgeData>>>,
    visited: Vec<bool>,
    order: Vec<VertexId>,
}

impl<'g, G: Graph> TraversalBase<'g, G> {
    pub(crate) fn new(graph: &'g G, source: VertexId) -> Result<Self> {
        if !graph.contains_id(source) {
            return Err(GraphError::SourceNotInGraph(source));
        }
        Ok(Self {
            graph,
            source,
            sentinel: f32::MAX,
            local: Vec::new(),
            via: Vec::new(),
            visited: Vec::new(),
            order: Vec::new(),
        })
    }

    pub(crate) fn graph(&self) -> &'g G {
        self.graph
    }

    pub(crate) fn source(&self) -> VertexId {
        self.source
    }

    pub(crate) fn sentinel(&self) -> f32 {
        self.sentinel
    }

    /// Upper bound on vertex indices, for sizing per-vertex tables.
    pub(crate) fn capacity(&self) -> usize {
        self.local.len()
    }

    /// Forget everything from the previous run.
    pub(crate) fn reset(&mut self) {
        let capacity = self
            .graph
            .vertex_ids()
            .map(|id| id.index() + 1)
            .max()
            .unwrap_or(0);
        self.sentinel = f32::MAX - self.graph.max_edge_weight();
        self.local.clear();
        self.local.resize_with(capacity, || None);
        self.via.clear();
        self.via.resize(capacity, None);
        self.visited.clear();
        self.visited.resize(capacity, false);
        self.order.clear();
    }

    pub(crate) fn local(&self, id: VertexId) -> Option<&Vertex<G::VertexData>> {
        self.local.get(id.index())?.as_ref()
    }

    /// The run-local copy of `id`, created on first touch.
    ///
    /// `None` only for a handle the graph does not know.
    pub(crate) fn touch(&mut self, id: VertexId) -> Option<&mut Vertex<G::VertexData>> {
        let slot = self.local.get_mut(id.index())?;
        if slot.is_none() {
            let mut copy = self.graph.vertex(id)?.clone();
            copy.reset(self.sentinel);
            *slot = Some(copy);
        }
        slot.as_mut()
    }

    /// Record the edge a vertex was last reached through.
    pub(crate) fn set_via(&mut self, id: VertexId, edge: &'g Edge<G::EdgeData>) {
        if let Some(slot) = self.via.get_mut(id.index()) {
            *slot = Some(edge);
        }
    }

    pub(crate) fn via(&self, id: VertexId) -> Option<&'g Edge<G::EdgeData>> {
        self.via.get(id.index()).copied().flatten()
    }

    /// Add `id` to the traversal result.
    pub(crate) fn mark_visited(&mut self, id: VertexId) {
        if let Some(flag) = self.visited.get_mut(id.index()) {
            if !*flag {
                *flag = true;
                self.order.push(id);
            }
        }
    }

    pub(crate) fn is_visited(&self, id: VertexId) -> bool {
        self.visited.get(id.index()).copied().unwrap_or(false)
    }

    pub(crate) fn order(&self) -> &[VertexId] {
        &self.order
    }

    pub(crate) fn visited_vertex(&self, id: VertexId) -> Option<&Vertex<G::VertexData>> {
        if self.is_visited(id) {
            self.local(id)
        } else {
            None
        }
    }

    /// The callback view of a touched vertex.
    pub(crate) fn element(
        &self,
        id: VertexId,
    ) -> Option<TraversalElement<'_, G::VertexData, G::EdgeData>> {
        Some(TraversalElement {
            id,
            vertex: self.local(id)?,
            edge: self.via(id),
        })
    }

    pub(crate) fn run_info(&self, algorithm: AlgorithmKind, target: Option<VertexId>) -> RunInfo {
        RunInfo {
            algorithm,
            source: self.source,
            target,
        }
    }

    pub(crate) fn summary(&self, algorithm: AlgorithmKind, stopped_early: bool) -> RunSummary {
        RunSummary {
            algorithm,
            source: self.source,
            visited: self.order.len(),
            stopped_early,
        }
    }

    pub(crate) fn path(&self, dest: VertexId) -> Result<Vec<VertexId>> {
        if !self.graph.contains_id(dest) {
            return Err(GraphError::VertexNotFound(dest));
        }
        if !self.is_visited(dest) {
            return Ok(Vec::new());
        }

        let mut path = vec![dest];
        let mut current = dest;
        // Parent links form a tree rooted at the source; the bound guards
        // against a corrupted chain.
        for _ in 0..self.local.len() {
            match self.local(current).and_then(|v| v.parent()) {
                Some(parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        if current != self.source {
            return Ok(Vec::new());
        }
        path.reverse();
        Ok(path)
    }
}

/// Sort key for the open set of weighted searches: rank, then handle.
///
/// Ties on rank are broken by handle so distinct vertices never collide.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ranked {
    pub(crate) rank: f32,
    pub(crate) id: VertexId,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_weight(self.rank, other.rank).then_with(|| self.id.cmp(&other.id))
    }
}

/// Ordered open set with decrease-key by removal and reinsertion.
///
/// The rank each vertex was queued with is remembered, so repositioning
/// removes exactly the stale entry even if the vertex's weight changed in
/// between.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    queue: BTreeSet<Ranked>,
    queued: Vec<Option<f32>>,
}

impl OpenSet {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: BTreeSet::new(),
            queued: vec![None; capacity],
        }
    }

    /// Queue `id` at `rank`, repositioning it if already queued.
    pub(crate) fn push(&mut self, id: VertexId, rank: f32) {
        let Some(slot) = self.queued.get_mut(id.index()) else {
            return;
        };
        if let Some(old) = slot.replace(rank) {
            self.queue.remove(&Ranked { rank: old, id });
        }
        self.queue.insert(Ranked { rank, id });
    }

    /// Take the lowest-ranked vertex.
    pub(crate) fn pop(&mut self) -> Option<VertexId> {
        let Ranked { id, .. } = self.queue.pop_first()?;
        if let Some(slot) = self.queued.get_mut(id.index()) {
            *slot = None;
        }
        Some(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Cheapest path from `from` to `to` by edge weight.
///
/// Empty when `to` is unreachable.
pub fn shortest_path<G: Graph>(graph: &G, from: VertexId, to: VertexId) -> Result<Vec<VertexId>> {
    let mut search = Dijkstra::new(graph, from)?;
    search.execute()?;
    search.path(to)
}

/// Every path the exhaustive edge walk discovers from `from`, the
/// single-vertex path included.
pub fn all_paths<G: Graph>(graph: &G, from: VertexId) -> Result<Vec<Vec<VertexId>>> {
    let mut walk = FullTraversal::new(graph, from)?;
    walk.execute()?;
    Ok(walk.into_paths())
}
