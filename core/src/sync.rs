//! Coarse-lock thread-safety facade over any [`Graph`].

use parking_lot::Mutex;

use crate::error::Result;
use crate::graph::Graph;
use crate::object::{Edge, Vertex, VertexId};

type VertexOf<G> = Vertex<<G as Graph>::VertexData>;
type EdgeOf<G> = Edge<<G as Graph>::EdgeData>;

/// A graph behind a single mutex.
///
/// Every call holds the lock for its whole duration; the guard is dropped on
/// every exit path, unwinding included. Queries that would hand out
/// iterators return snapshots collected under the lock instead, so a
/// snapshot can be stale by the time the caller reads it.
///
/// For compound operations (a traversal, a read-modify-write) use
/// [`with_graph`](Self::with_graph) or [`with_graph_mut`](Self::with_graph_mut),
/// which keep the lock across the whole closure.
#[derive(Debug, Default)]
pub struct SynchronizedGraph<G> {
    inner: Mutex<G>,
}

impl<G: Graph> SynchronizedGraph<G> {
    pub fn new(graph: G) -> Self {
        Self {
            inner: Mutex::new(graph),
        }
    }

    pub fn into_inner(self) -> G {
        self.inner.into_inner()
    }

    /// Run `f` with shared access while holding the lock.
    pub fn with_graph<R, F: FnOnce(&G) -> R>(&self, f: F) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access while holding the lock.
    pub fn with_graph_mut<R, F: FnOnce(&mut G) -> R>(&self, f: F) -> R {
        f(&mut self.inner.lock())
    }

    pub fn is_directed(&self) -> bool {
        self.inner.lock().is_directed()
    }

    pub fn num_verts(&self) -> usize {
        self.inner.lock().num_verts()
    }

    pub fn num_edges(&self) -> usize {
        self.inner.lock().num_edges()
    }

    pub fn add_vertex(&self, vertex: VertexOf<G>) -> bool {
        self.inner.lock().add_vertex(vertex)
    }

    pub fn insert_vertex(&self, vertex: VertexOf<G>) -> VertexId {
        self.inner.lock().insert_vertex(vertex)
    }

    pub fn vertex_id(&self, payload: Option<&G::VertexData>) -> Option<VertexId> {
        self.inner.lock().vertex_id(payload)
    }

    pub fn lookup(&self, payload: &G::VertexData) -> Option<VertexId> {
        self.inner.lock().lookup(payload)
    }

    /// A copy of the stored vertex.
    pub fn vertex(&self, id: VertexId) -> Option<VertexOf<G>> {
        self.inner.lock().vertex(id).cloned()
    }

    pub fn contains_vertex(&self, vertex: &VertexOf<G>) -> bool {
        self.inner.lock().contains_vertex(vertex)
    }

    pub fn remove_vertex(&self, id: VertexId) -> bool {
        self.inner.lock().remove_vertex(id)
    }

    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.inner.lock().vertex_ids().collect()
    }

    pub fn add_edge(&self, edge: EdgeOf<G>) -> Result<bool> {
        self.inner.lock().add_edge(edge)
    }

    pub fn remove_edge(&self, edge: &EdgeOf<G>) -> Result<bool> {
        self.inner.lock().remove_edge(edge)
    }

    pub fn contains_edge(&self, edge: &EdgeOf<G>) -> bool {
        self.inner.lock().contains_edge(edge)
    }

    pub fn incident_edges(&self, id: VertexId) -> Vec<EdgeOf<G>> {
        self.inner.lock().incident_edges(id).cloned().collect()
    }

    pub fn edges(&self) -> Vec<EdgeOf<G>> {
        self.inner.lock().edges().cloned().collect()
    }

    pub fn find_edge(&self, source: VertexId, dest: VertexId) -> Option<EdgeOf<G>> {
        self.inner.lock().find_edge(source, dest).cloned()
    }

    /// Deep copy of the wrapped graph.
    pub fn snapshot(&self) -> G {
        self.inner.lock().clone()
    }

    pub fn reverse(&self) -> G {
        self.inner.lock().reverse().into_owned()
    }

    pub fn make_undirected(&self) -> G {
        self.inner.lock().make_undirected().into_owned()
    }
}

impl<G: Graph> Clone for SynchronizedGraph<G> {
    fn clone(&self) -> Self {
        Self::new(self.snapshot())
    }
}

impl<G: Graph> From<G> for SynchronizedGraph<G> {
    fn from(graph: G) -> Self {
        Self::new(graph)
    }
}
