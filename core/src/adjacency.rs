use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{Edge, EdgeId, GraphObject, Vertex, VertexId};

/// One arena slot: the stored vertex, its incident (outgoing) edge entries,
/// and the sources of every entry pointing at it.
#[derive(Debug, Clone)]
struct Slot<V, E> {
    vertex: Vertex<V>,
    edges: Vec<Edge<E>>,
    incoming: Vec<VertexId>,
}

impl<V, E> Slot<V, E> {
    fn new(vertex: Vertex<V>) -> Self {
        Self {
            vertex,
            edges: Vec::new(),
            incoming: Vec::new(),
        }
    }

    fn remove_incoming(&mut self, from: VertexId) {
        if let Some(pos) = self.incoming.iter().position(|&v| v == from) {
            self.incoming.swap_remove(pos);
        }
    }
}

/// Adjacency-list graph store.
///
/// Vertices live in an append-only arena addressed by [`VertexId`]; a
/// payload index deduplicates them. Each slot keeps its outgoing edge
/// entries in insertion order. Undirected edges are stored as two mirrored
/// entries that are always added and removed together.
///
/// `clone()` copies the arena, so the clone shares no mutable state with the
/// source while every handle keeps naming the same element.
#[derive(Debug, Clone)]
pub struct AdjacencyList<V, E = ()> {
    directed: bool,
    slots: Vec<Option<Slot<V, E>>>,
    index: HashMap<V, VertexId>,
    anonymous: Option<VertexId>,
    live: usize,
    num_edges: usize,
    next_edge_id: usize,
}

impl<V, E> AdjacencyList<V, E>
where
    V: Eq + Hash + Clone,
    E: PartialEq + Clone,
{
    pub fn new(directed: bool) -> Self {
        Self::with_capacity(directed, 0)
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Pre-allocate for a known vertex count.
    pub fn with_capacity(directed: bool, vertex_count: usize) -> Self {
        Self {
            directed,
            slots: Vec::with_capacity(vertex_count),
            index: HashMap::with_capacity(vertex_count),
            anonymous: None,
            live: 0,
            num_edges: 0,
            next_edge_id: 0,
        }
    }

    /// Bulk load from `(from, to, weight)` triples, inserting endpoints as
    /// they first appear.
    pub fn from_edges<I>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = (V, V, f32)>,
    {
        let mut graph = Self::new(directed);
        graph.load_edges(edges);
        graph
    }

    /// Append `(from, to, weight)` triples, inserting missing endpoints.
    /// Returns the number of edges actually inserted.
    pub fn load_edges<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (V, V, f32)>,
    {
        let mut inserted = 0;
        for (from, to, weight) in edges {
            let from = self.insert_vertex(Vertex::new(from));
            let to = self.insert_vertex(Vertex::new(to));
            if self.insert_logical(Edge::new(from, to).with_weight(weight)) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Number of edge entries leaving `id` (mirrors included).
    pub fn out_degree(&self, id: VertexId) -> usize {
        self.slot(id).map_or(0, |s| s.edges.len())
    }

    /// Number of edge entries arriving at `id` (mirrors included).
    pub fn in_degree(&self, id: VertexId) -> usize {
        self.slot(id).map_or(0, |s| s.incoming.len())
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let slots_mem = self.slots.capacity() * size_of::<Option<Slot<V, E>>>();
        let edges_mem: usize = self
            .slots
            .iter()
            .flatten()
            .map(|s| {
                s.edges.capacity() * size_of::<Edge<E>>()
                    + s.incoming.capacity() * size_of::<VertexId>()
            })
            .sum();
        let index_mem = self.index.capacity() * (size_of::<V>() + size_of::<VertexId>() + 8);

        slots_mem + edges_mem + index_mem
    }

    fn slot(&self, id: VertexId) -> Option<&Slot<V, E>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: VertexId) -> Option<&mut Slot<V, E>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn check_endpoint(&self, id: VertexId) -> Result<()> {
        match self.slot(id) {
            Some(_) => Ok(()),
            None => Err(GraphError::EdgeEndpointMissing(id)),
        }
    }

    /// Store one directed entry. Endpoints must be live.
    fn insert_entry(&mut self, edge: Edge<E>) -> bool {
        let (from, to) = edge.endpoints();
        let Some(slot) = self.slot_mut(from) else {
            return false;
        };
        if slot.edges.contains(&edge) {
            return false;
        }
        slot.edges.push(edge);
        if let Some(target) = self.slot_mut(to) {
            target.incoming.push(from);
        }
        true
    }

    /// Drop one directed entry equal to `edge`.
    fn remove_entry(&mut self, edge: &Edge<E>) -> bool {
        let (from, to) = edge.endpoints();
        let Some(slot) = self.slot_mut(from) else {
            return false;
        };
        let Some(pos) = slot.edges.iter().position(|e| e == edge) else {
            return false;
        };
        slot.edges.remove(pos);
        if let Some(target) = self.slot_mut(to) {
            target.remove_incoming(from);
        }
        true
    }

    fn has_entry(&self, edge: &Edge<E>) -> bool {
        self.slot(edge.from())
            .is_some_and(|s| s.edges.contains(edge))
    }

    /// Insert a logical edge (plus its mirror when undirected) without
    /// validating endpoints.
    fn insert_logical(&mut self, mut edge: Edge<E>) -> bool {
        edge.set_id(Some(EdgeId(self.next_edge_id)));

        let mirror = if self.directed || edge.is_self_loop() {
            None
        } else {
            Some(edge.reverse().into_owned())
        };

        let inserted = self.insert_entry(edge);
        if let Some(mirror) = mirror {
            let mirrored = self.insert_entry(mirror);
            assert_eq!(
                inserted, mirrored,
                "undirected edge and its mirror diverged on insert"
            );
        }

        if inserted {
            self.next_edge_id += 1;
            self.num_edges += 1;
        }
        inserted
    }

    /// Shallow-copy the vertex arena with every edge list emptied.
    fn vertices_only(&self, directed: bool) -> Self {
        Self {
            directed,
            slots: self
                .slots
                .iter()
                .map(|s| s.as_ref().map(|s| Slot::new(s.vertex.clone())))
                .collect(),
            index: self.index.clone(),
            anonymous: self.anonymous,
            live: self.live,
            num_edges: 0,
            next_edge_id: 0,
        }
    }
}

impl<V, E> Default for AdjacencyList<V, E>
where
    V: Eq + Hash + Clone,
    E: PartialEq + Clone,
{
    fn default() -> Self {
        Self::directed()
    }
}

impl<V, E> Graph for AdjacencyList<V, E>
where
    V: Eq + Hash + Clone,
    E: PartialEq + Clone,
{
    type VertexData = V;
    type EdgeData = E;

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn empty_like(&self) -> Self {
        Self::new(self.directed)
    }

    fn num_verts(&self) -> usize {
        self.live
    }

    fn num_edges(&self) -> usize {
        self.num_edges
    }

    fn insert_vertex(&mut self, vertex: Vertex<V>) -> VertexId {
        if let Some(id) = self.vertex_id(vertex.payload()) {
            return id;
        }
        let id = VertexId(self.slots.len());
        match vertex.payload() {
            Some(payload) => {
                self.index.insert(payload.clone(), id);
            }
            None => self.anonymous = Some(id),
        }
        self.slots.push(Some(Slot::new(vertex)));
        self.live += 1;
        id
    }

    fn vertex_id(&self, payload: Option<&V>) -> Option<VertexId> {
        match payload {
            Some(payload) => self.index.get(payload).copied(),
            None => self.anonymous,
        }
    }

    fn vertex(&self, id: VertexId) -> Option<&Vertex<V>> {
        self.slot(id).map(|s| &s.vertex)
    }

    fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex<V>> {
        self.slot_mut(id).map(|s| &mut s.vertex)
    }

    fn remove_vertex(&mut self, id: VertexId) -> bool {
        let Some(slot) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return false;
        };

        // Every logical edge at an undirected vertex has exactly one entry in
        // its own list; a directed vertex also loses the entries pointing at it.
        let mut removed = slot.edges.len();

        for edge in &slot.edges {
            if edge.to() != id {
                if let Some(target) = self.slot_mut(edge.to()) {
                    target.remove_incoming(id);
                }
            }
        }

        let directed = self.directed;
        for &from in &slot.incoming {
            if from == id {
                continue;
            }
            if let Some(source) = self.slot_mut(from) {
                let before = source.edges.len();
                source.edges.retain(|e| e.to() != id);
                if directed {
                    removed += before - source.edges.len();
                }
            }
        }

        match slot.vertex.payload() {
            Some(payload) => {
                self.index.remove(payload);
            }
            None => self.anonymous = None,
        }
        self.live -= 1;
        self.num_edges -= removed;
        true
    }

    fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| VertexId(i))
    }

    fn add_edge(&mut self, mut edge: Edge<E>) -> Result<bool> {
        self.check_endpoint(edge.from())?;
        self.check_endpoint(edge.to())?;
        if !self.directed {
            // Primary entries of undirected edges are stored unreversed.
            edge.set_reversed(false);
        }
        Ok(self.insert_logical(edge))
    }

    fn remove_edge(&mut self, edge: &Edge<E>) -> Result<bool> {
        self.check_endpoint(edge.from())?;
        self.check_endpoint(edge.to())?;

        let removed = self.remove_entry(edge);
        if !self.directed && !edge.is_self_loop() {
            let mirrored = self.remove_entry(&edge.reverse());
            assert_eq!(
                removed, mirrored,
                "undirected edge and its mirror diverged on remove"
            );
        }
        if removed {
            self.num_edges -= 1;
        }
        Ok(removed)
    }

    fn contains_edge(&self, edge: &Edge<E>) -> bool {
        let present = self.has_entry(edge);
        if !self.directed && !edge.is_self_loop() {
            let mirrored = self.has_entry(&edge.reverse());
            assert_eq!(present, mirrored, "undirected edge stored on one side only");
        }
        present
    }

    fn incident_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.slot(id).into_iter().flat_map(|s| s.edges.iter())
    }

    fn edges(&self) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.slots.iter().flatten().flat_map(|s| s.edges.iter())
    }

    fn reverse(&self) -> Cow<'_, Self> {
        if !self.directed {
            return Cow::Borrowed(self);
        }
        let mut reversed = self.vertices_only(true);
        for edge in self.edges() {
            reversed.insert_entry(edge.reverse().into_owned());
        }
        reversed.num_edges = self.num_edges;
        reversed.next_edge_id = self.next_edge_id;
        Cow::Owned(reversed)
    }

    fn make_undirected(&self) -> Cow<'_, Self> {
        if !self.directed {
            return Cow::Borrowed(self);
        }
        let mut undirected = self.vertices_only(false);
        for edge in self.edges() {
            let mut copy = edge.clone();
            copy.set_reversed(false);
            undirected.insert_logical(copy);
        }
        Cow::Owned(undirected)
    }
}

/// Structural equality: same directedness, equal vertex sets, and equal
/// edge sets once endpoints are matched by payload.
impl<V, E> PartialEq for AdjacencyList<V, E>
where
    V: Eq + Hash + Clone,
    E: PartialEq + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        if self.directed != other.directed
            || self.live != other.live
            || self.num_edges != other.num_edges
        {
            return false;
        }
        if !self.vertices().all(|(_, v)| other.contains_vertex(v)) {
            return false;
        }
        self.logical_edges().all(|edge| {
            let from = self.vertex(edge.from()).and_then(|v| other.vertex_id(v.payload()));
            let to = self.vertex(edge.to()).and_then(|v| other.vertex_id(v.payload()));
            match (from, to) {
                (Some(from), Some(to)) => {
                    let mut probe = edge.clone();
                    probe.rebind(from, to);
                    other.has_entry(&probe)
                }
                _ => false,
            }
        })
    }
}
