use std::borrow::Cow;
use std::hash::Hash;

use crate::error::Result;
use crate::object::{Edge, GraphObject, Vertex, VertexId};

/// A mutable, cloneable, directed or undirected graph.
///
/// Vertices are deduplicated by payload equality, not identity, and are
/// addressed by [`VertexId`] handles. Undirected graphs model every edge as
/// two mirrored directed entries, so "incident" and "outgoing" coincide.
pub trait Graph: Clone {
    type VertexData: Eq + Hash + Clone;
    type EdgeData: PartialEq + Clone;

    fn is_directed(&self) -> bool;

    /// An empty graph with the same directedness.
    fn empty_like(&self) -> Self;

    fn num_verts(&self) -> usize;

    /// Logical edge count: an undirected pair counts once, as does a self-loop.
    fn num_edges(&self) -> usize;

    /// Insert `vertex` unless an equal one is already present, and return
    /// the handle of the stored vertex either way.
    fn insert_vertex(&mut self, vertex: Vertex<Self::VertexData>) -> VertexId;

    /// Handle of the vertex whose payload equals `payload`.
    fn vertex_id(&self, payload: Option<&Self::VertexData>) -> Option<VertexId>;

    fn vertex(&self, id: VertexId) -> Option<&Vertex<Self::VertexData>>;

    fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex<Self::VertexData>>;

    /// Remove a vertex and every edge touching it. Returns false if the
    /// handle names no live vertex.
    fn remove_vertex(&mut self, id: VertexId) -> bool;

    /// Live vertex handles in insertion order.
    fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_;

    /// Insert an edge whose endpoints are live vertices of this graph.
    ///
    /// Fails with an invalid-argument error if either endpoint is absent.
    /// Returns false if an equal edge is already stored.
    fn add_edge(&mut self, edge: Edge<Self::EdgeData>) -> Result<bool>;

    /// Remove an edge (and its mirror in an undirected graph).
    fn remove_edge(&mut self, edge: &Edge<Self::EdgeData>) -> Result<bool>;

    fn contains_edge(&self, edge: &Edge<Self::EdgeData>) -> bool;

    /// Edges leaving `id`. Empty for a handle that names no vertex.
    fn incident_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge<Self::EdgeData>> + '_;

    /// Every stored edge entry, mirrors included.
    fn edges(&self) -> impl Iterator<Item = &Edge<Self::EdgeData>> + '_;

    /// A new graph with every edge flipped, or this same graph when it is
    /// undirected.
    fn reverse(&self) -> Cow<'_, Self>;

    /// This graph if already undirected, otherwise an undirected copy.
    fn make_undirected(&self) -> Cow<'_, Self>;

    /// Insert `vertex` unless an equal one is already present.
    ///
    /// Returns whether it was inserted. A duplicate insert is a no-op.
    fn add_vertex(&mut self, vertex: Vertex<Self::VertexData>) -> bool {
        let before = self.num_verts();
        self.insert_vertex(vertex);
        self.num_verts() > before
    }

    fn lookup(&self, payload: &Self::VertexData) -> Option<VertexId> {
        self.vertex_id(Some(payload))
    }

    fn contains_vertex(&self, vertex: &Vertex<Self::VertexData>) -> bool {
        self.vertex_id(vertex.payload()).is_some()
    }

    fn contains_id(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<Self::VertexData>)> + '_ {
        self.vertex_ids()
            .filter_map(move |id| self.vertex(id).map(|v| (id, v)))
    }

    /// Every edge once: mirror entries of undirected edges are skipped.
    fn logical_edges(&self) -> impl Iterator<Item = &Edge<Self::EdgeData>> + '_ {
        let directed = self.is_directed();
        self.edges().filter(move |e| directed || !e.is_reversed())
    }

    /// First edge from `source` whose target is `dest`.
    fn find_edge(&self, source: VertexId, dest: VertexId) -> Option<&Edge<Self::EdgeData>> {
        self.incident_edges(source).find(|e| e.to() == dest)
    }

    /// Heaviest edge weight, or 0 for a graph without edges.
    fn max_edge_weight(&self) -> f32 {
        self.edges().map(|e| e.weight()).fold(0.0, f32::max)
    }
}
