use tracing::{debug, trace};

use super::{
    AcceptAll, AlgorithmKind, GraphTraversal, OpenSet, TraversalBase, TraversalCallback,
};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{GraphObject, Vertex, VertexId};

/// Single-source cheapest paths over non-negative edge weights.
///
/// Each visited copy's weight is its distance from the source. The callback
/// is consulted once per vertex as it is settled; returning false stops the
/// whole run, leaving the vertices settled so far as the result.
pub struct Dijkstra<'g, G: Graph, C = AcceptAll> {
    base: TraversalBase<'g, G>,
    callback: C,
    stopped_early: bool,
}

impl<'g, G: Graph> Dijkstra<'g, G, AcceptAll> {
    pub fn new(graph: &'g G, source: VertexId) -> Result<Self> {
        Ok(Self {
            base: TraversalBase::new(graph, source)?,
            callback: AcceptAll,
            stopped_early: false,
        })
    }
}

impl<'g, G, C> Dijkstra<'g, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    pub fn with_callback<C2>(self, callback: C2) -> Dijkstra<'g, G, C2>
    where
        C2: TraversalCallback<G::VertexData, G::EdgeData>,
    {
        let mut base = self.base;
        base.reset();
        Dijkstra {
            base,
            callback,
            stopped_early: false,
        }
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Whether the last run was cut short by the callback.
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// Distance from the source to `dest`, or `None` if the last run did not
    /// settle `dest`.
    pub fn distance(&self, dest: VertexId) -> Result<Option<f32>> {
        if !self.base.graph().contains_id(dest) {
            return Err(GraphError::VertexNotFound(dest));
        }
        Ok(self.base.visited_vertex(dest).map(|v| v.weight()))
    }

    fn run(&mut self) {
        let graph = self.base.graph();
        let source = self.base.source();
        let mut open = OpenSet::with_capacity(self.base.capacity());
        let mut settled = vec![false; self.base.capacity()];

        if let Some(root) = self.base.touch(source) {
            root.set_weight(0.0);
            root.set_level(0);
            open.push(source, 0.0);
        }

        while let Some(u) = open.pop() {
            settled[u.index()] = true;

            let accepted = match self.base.element(u) {
                Some(element) => self.callback.on_traverse(&element),
                None => false,
            };
            if !accepted {
                debug!(vertex = %u, pending = open.len(), "dijkstra: stopped by callback");
                self.stopped_early = true;
                return;
            }
            self.base.mark_visited(u);

            let (distance, level) = match self.base.local(u) {
                Some(v) => (v.weight(), v.level()),
                None => continue,
            };

            for edge in graph.incident_edges(u) {
                let v = edge.to();
                if settled.get(v.index()).copied().unwrap_or(true) {
                    continue;
                }
                let candidate = distance + edge.weight();
                let Some(local) = self.base.touch(v) else {
                    continue;
                };
                if candidate < local.weight() {
                    trace!(from = %u, to = %v, distance = candidate, "dijkstra: relaxed");
                    local.set_weight(candidate);
                    local.set_parent(Some(u));
                    local.set_level(level + 1);
                    self.base.set_via(v, edge);
                    open.push(v, candidate);
                }
            }
        }
    }
}

impl<G, C> GraphTraversal for Dijkstra<'_, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    type VertexData = G::VertexData;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dijkstra
    }

    fn source(&self) -> VertexId {
        self.base.source()
    }

    fn execute(&mut self) -> Result<()> {
        self.base.reset();
        self.stopped_early = false;
        self.callback
            .on_begin(&self.base.run_info(AlgorithmKind::Dijkstra, None));
        debug!(
            source = %self.base.source(),
            sentinel = self.base.sentinel(),
            "dijkstra: starting"
        );

        self.run();

        let summary = self.base.summary(AlgorithmKind::Dijkstra, self.stopped_early);
        debug!(visited = summary.visited, stopped_early = summary.stopped_early, "dijkstra: finished");
        self.callback.on_finish(&summary);
        Ok(())
    }

    fn traversal(&self) -> &[VertexId] {
        self.base.order()
    }

    fn path(&self, dest: VertexId) -> Result<Vec<VertexId>> {
        self.base.path(dest)
    }

    fn visited_vertex(&self, id: VertexId) -> Option<&Vertex<G::VertexData>> {
        self.base.visited_vertex(id)
    }
}
