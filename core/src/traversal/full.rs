use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use super::{
    AcceptAll, AlgorithmKind, GraphTraversal, TraversalBase, TraversalCallback, TraversalElement,
};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{EdgeId, GraphObject, Vertex, VertexId};

/// Identity of one logical edge. Stored edges carry an [`EdgeId`] shared by
/// both entries of an undirected pair; anything else is keyed by its
/// position in the source vertex's edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    Id(EdgeId),
    Entry(VertexId, usize),
}

/// One directed entry: the logical edge plus the vertex it is left from.
type EntryKey = (EdgeKey, VertexId);

/// Breadth-first walk that follows every edge entry exactly once, recording
/// the path along which each entry was first taken.
///
/// Vertices may be reached many times, each time along a different path;
/// edge entries may not, so a run yields at most one path per entry plus
/// the single-vertex path of the source. An undirected edge has an entry in
/// each direction and may be walked both ways by different paths, but no
/// path uses the same edge twice. A callback returning false drops that
/// path and does not extend it.
pub struct FullTraversal<'g, G: Graph, C = AcceptAll> {
    base: TraversalBase<'g, G>,
    callback: C,
    paths: Vec<Vec<VertexId>>,
}

impl<'g, G: Graph> FullTraversal<'g, G, AcceptAll> {
    pub fn new(graph: &'g G, source: VertexId) -> Result<Self> {
        Ok(Self {
            base: TraversalBase::new(graph, source)?,
            callback: AcceptAll,
            paths: Vec::new(),
        })
    }
}

impl<'g, G, C> FullTraversal<'g, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    pub fn with_callback<C2>(self, callback: C2) -> FullTraversal<'g, G, C2>
    where
        C2: TraversalCallback<G::VertexData, G::EdgeData>,
    {
        let mut base = self.base;
        base.reset();
        FullTraversal {
            base,
            callback,
            paths: Vec::new(),
        }
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    /// Every recorded path, in discovery order. The first is the source
    /// alone.
    pub fn all_paths(&self) -> &[Vec<VertexId>] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<Vec<VertexId>> {
        self.paths
    }

    /// Recorded paths ending at `dest`.
    pub fn paths_to(&self, dest: VertexId) -> Result<Vec<&[VertexId]>> {
        if !self.base.graph().contains_id(dest) {
            return Err(GraphError::VertexNotFound(dest));
        }
        Ok(self
            .paths
            .iter()
            .filter(|p| p.last() == Some(&dest))
            .map(Vec::as_slice)
            .collect())
    }

    fn run(&mut self) {
        let graph = self.base.graph();
        let source = self.base.source();
        let mut used: HashSet<EntryKey> = HashSet::new();
        let mut queue: VecDeque<usize> = VecDeque::new();
        // Summed edge weight and logical edges of each recorded path
        let mut costs: Vec<f32> = Vec::new();
        let mut trails: Vec<Vec<EdgeKey>> = Vec::new();

        if let Some(root) = self.base.touch(source) {
            root.set_weight(0.0);
            root.set_level(0);
        }
        let accepted = match self.base.element(source) {
            Some(element) => self.callback.on_traverse(&element),
            None => false,
        };
        if !accepted {
            return;
        }
        self.base.mark_visited(source);
        self.paths.push(vec![source]);
        costs.push(0.0);
        trails.push(Vec::new());
        queue.push_back(0);

        while let Some(index) = queue.pop_front() {
            let Some(&u) = self.paths[index].last() else {
                continue;
            };
            let level = self.paths[index].len() as i32;
            let cost = costs[index];

            for (position, edge) in graph.incident_edges(u).enumerate() {
                let key = edge
                    .id()
                    .map_or(EdgeKey::Entry(u, position), EdgeKey::Id);
                if trails[index].contains(&key) || !used.insert((key, u)) {
                    continue;
                }
                let v = edge.to();
                let Some(stored) = graph.vertex(v) else {
                    continue;
                };

                // Each arrival gets its own annotated copy
                let mut arrival = stored.clone();
                arrival.reset(self.base.sentinel());
                arrival.set_parent(Some(u));
                arrival.set_level(level);
                arrival.set_weight(cost + edge.weight());
                let element = TraversalElement {
                    id: v,
                    vertex: &arrival,
                    edge: Some(edge),
                };
                if !self.callback.on_traverse(&element) {
                    trace!(from = %u, to = %v, "full: path rejected by callback");
                    continue;
                }

                if !self.base.is_visited(v) {
                    if let Some(local) = self.base.touch(v) {
                        *local = arrival;
                    }
                    self.base.set_via(v, edge);
                    self.base.mark_visited(v);
                }
                let mut path = self.paths[index].clone();
                path.push(v);
                self.paths.push(path);
                costs.push(cost + edge.weight());
                let mut trail = trails[index].clone();
                trail.push(key);
                trails.push(trail);
                queue.push_back(self.paths.len() - 1);
            }
        }
    }
}

impl<G, C> GraphTraversal for FullTraversal<'_, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    type VertexData = G::VertexData;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Full
    }

    fn source(&self) -> VertexId {
        self.base.source()
    }

    fn execute(&mut self) -> Result<()> {
        self.base.reset();
        self.paths.clear();
        self.callback
            .on_begin(&self.base.run_info(AlgorithmKind::Full, None));
        debug!(source = %self.base.source(), "full: starting");

        self.run();

        let summary = self.base.summary(AlgorithmKind::Full, false);
        debug!(visited = summary.visited, paths = self.paths.len(), "full: finished");
        self.callback.on_finish(&summary);
        Ok(())
    }

    /// Vertices in first-arrival order.
    fn traversal(&self) -> &[VertexId] {
        self.base.order()
    }

    /// The path along which `dest` was first reached.
    fn path(&self, dest: VertexId) -> Result<Vec<VertexId>> {
        self.base.path(dest)
    }

    fn visited_vertex(&self, id: VertexId) -> Option<&Vertex<G::VertexData>> {
        self.base.visited_vertex(id)
    }
}
