//! Vertex and edge model.
//!
//! Both element kinds carry an optional caller payload and a mutable
//! `weight`. Equality and hashing look only at the payload (plus the
//! endpoints for edges); weight and traversal scratch fields never take part.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Handle of a vertex slot in its graph's arena.
///
/// Handles are never reused after removal, and a cloned graph keeps every
/// handle of its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VertexId(pub usize);

impl VertexId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for VertexId {
    fn from(index: usize) -> Self {
        VertexId(index)
    }
}

/// Identifier of a logical edge, assigned when the edge is stored.
///
/// Both mirror entries of an undirected edge share one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Numeric weight comparison. NaN falls back to IEEE total order so the
/// result is always defined.
pub(crate) fn cmp_weight(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Base behaviour shared by vertices and edges: an optional payload and a
/// mutable weight.
pub trait GraphObject {
    type Payload;

    fn payload(&self) -> Option<&Self::Payload>;

    fn weight(&self) -> f32;

    fn set_weight(&mut self, weight: f32);

    /// Order by weight, then by equality, then by a deterministic hash of
    /// the equality key.
    ///
    /// This is not consistent with `Eq`: two unequal objects whose keys hash
    /// alike compare `Equal`. Only meaningful for ranking objects during a
    /// single algorithm run.
    fn weight_order(&self, other: &Self) -> Ordering
    where
        Self: Eq + Hash,
    {
        cmp_weight(self.weight(), other.weight()).then_with(|| {
            if self == other {
                Ordering::Equal
            } else {
                stable_hash(self).cmp(&stable_hash(other))
            }
        })
    }
}

fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    // DefaultHasher::new() uses fixed keys, so this is stable within a build.
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A graph vertex.
///
/// `parent` and `level` are traversal annotations: a traversal hands out
/// copies of the graph's vertices with these filled in for its own run.
/// Vertices stored in a graph keep whatever the caller set.
#[derive(Debug, Clone)]
pub struct Vertex<V> {
    payload: Option<V>,
    weight: f32,
    parent: Option<VertexId>,
    level: i32,
}

impl<V> Vertex<V> {
    /// Level of a vertex no traversal has reached.
    pub const UNVISITED: i32 = -1;

    pub fn new(payload: V) -> Self {
        Self::from_payload(Some(payload))
    }

    /// A vertex without payload. All such vertices are equal to each other.
    pub fn anonymous() -> Self {
        Self::from_payload(None)
    }

    pub fn from_payload(payload: Option<V>) -> Self {
        Self {
            payload,
            weight: 0.0,
            parent: None,
            level: Self::UNVISITED,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn into_payload(self) -> Option<V> {
        self.payload
    }

    pub fn parent(&self) -> Option<VertexId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<VertexId>) {
        self.parent = parent;
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    pub fn is_visited(&self) -> bool {
        self.level != Self::UNVISITED
    }

    /// Put the scratch fields back to their pre-run state.
    pub fn reset(&mut self, sentinel_weight: f32) {
        self.weight = sentinel_weight;
        self.parent = None;
        self.level = Self::UNVISITED;
    }
}

impl<V> GraphObject for Vertex<V> {
    type Payload = V;

    fn payload(&self) -> Option<&V> {
        self.payload.as_ref()
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }
}

impl<V: PartialEq> PartialEq for Vertex<V> {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl<V: Eq> Eq for Vertex<V> {}

impl<V: Hash> Hash for Vertex<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
    }
}

/// A directed edge between two vertices of the same graph.
///
/// Undirected graphs store each edge twice, once per direction; the mirror
/// entry has `reversed` set and shares the original's [`EdgeId`].
#[derive(Debug, Clone)]
pub struct Edge<E> {
    from: VertexId,
    to: VertexId,
    payload: Option<E>,
    weight: f32,
    reversed: bool,
    id: Option<EdgeId>,
}

impl<E> Edge<E> {
    /// Weight of an edge created without an explicit one.
    pub const DEFAULT_WEIGHT: f32 = 1.0;

    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self {
            from,
            to,
            payload: None,
            weight: Self::DEFAULT_WEIGHT,
            reversed: false,
            id: None,
        }
    }

    pub fn with_payload(mut self, payload: E) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn from(&self) -> VertexId {
        self.from
    }

    pub fn to(&self) -> VertexId {
        self.to
    }

    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.from, self.to)
    }

    /// True for the mirror entry of an undirected edge, or for an edge
    /// produced by [`Edge::reverse`].
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Id assigned by the graph that stores this edge; `None` for an edge
    /// that was never inserted.
    pub fn id(&self) -> Option<EdgeId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<EdgeId>) {
        self.id = id;
    }

    pub(crate) fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    pub(crate) fn rebind(&mut self, from: VertexId, to: VertexId) {
        self.from = from;
        self.to = to;
    }

    pub fn into_payload(self) -> Option<E> {
        self.payload
    }
}

impl<E: Clone> Edge<E> {
    /// The same edge traversed the other way, with `reversed` toggled.
    ///
    /// A reversed self-loop is the self-loop itself, so it comes back
    /// borrowed.
    pub fn reverse(&self) -> Cow<'_, Edge<E>> {
        if self.is_self_loop() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Edge {
            from: self.to,
            to: self.from,
            payload: self.payload.clone(),
            weight: self.weight,
            reversed: !self.reversed,
            id: self.id,
        })
    }
}

impl<E> GraphObject for Edge<E> {
    type Payload = E;

    fn payload(&self) -> Option<&E> {
        self.payload.as_ref()
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }
}

impl<E: PartialEq> PartialEq for Edge<E> {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.payload == other.payload
    }
}

impl<E: Eq> Eq for Edge<E> {}

impl<E: Hash> Hash for Edge<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.payload.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_equality_ignores_scratch() {
        let mut a = Vertex::new("a").with_weight(3.0);
        a.set_level(2);
        a.set_parent(Some(VertexId(9)));
        let b = Vertex::new("a");
        assert_eq!(a, b);
        assert_ne!(a, Vertex::new("b"));
        assert_eq!(Vertex::<&str>::anonymous(), Vertex::anonymous());
    }

    #[test]
    fn test_vertex_reset() {
        let mut v = Vertex::new(1u32).with_weight(2.5);
        v.set_level(4);
        v.set_parent(Some(VertexId(0)));
        v.reset(f32::MAX);
        assert_eq!(v.weight(), f32::MAX);
        assert_eq!(v.parent(), None);
        assert_eq!(v.level(), Vertex::<u32>::UNVISITED);
        assert!(!v.is_visited());
    }

    #[test]
    fn test_clone_copies_scratch() {
        let mut v = Vertex::new(String::from("x")).with_weight(1.5);
        v.set_level(3);
        let mut c = v.clone();
        assert_eq!(c.level(), 3);
        assert_eq!(c.weight(), 1.5);
        c.set_weight(9.0);
        assert_eq!(v.weight(), 1.5);
    }

    #[test]
    fn test_weight_order() {
        let light = Vertex::new("a").with_weight(1.0);
        let heavy = Vertex::new("b").with_weight(2.0);
        assert_eq!(light.weight_order(&heavy), Ordering::Less);
        assert_eq!(heavy.weight_order(&light), Ordering::Greater);

        // Equal weight and equal payload
        let twin = Vertex::new("a").with_weight(1.0);
        assert_eq!(light.weight_order(&twin), Ordering::Equal);

        // Equal weight, different payload: tie-break is deterministic and antisymmetric
        let other = Vertex::new("z").with_weight(1.0);
        let forward = light.weight_order(&other);
        assert_eq!(forward, light.weight_order(&other));
        assert_eq!(forward.reverse(), other.weight_order(&light));
    }

    #[test]
    fn test_edge_equality() {
        let a = VertexId(0);
        let b = VertexId(1);
        let e1 = Edge::new(a, b).with_payload("road").with_weight(4.0);
        let e2 = Edge::new(a, b).with_payload("road").with_weight(7.0);
        let e3 = Edge::new(b, a).with_payload("road");
        let e4 = Edge::new(a, b).with_payload("rail");
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
        assert_ne!(e1, e4);
    }

    #[test]
    fn test_edge_reverse() {
        let e = Edge::new(VertexId(0), VertexId(1)).with_payload(5u8).with_weight(2.0);
        let r = e.reverse().into_owned();
        assert_eq!(r.endpoints(), (VertexId(1), VertexId(0)));
        assert!(r.is_reversed());
        assert_eq!(r.weight(), 2.0);
        assert_eq!(r.payload(), Some(&5));

        let back = r.reverse().into_owned();
        assert!(!back.is_reversed());
        assert_eq!(back, e);
    }

    #[test]
    fn test_self_loop_reverse_is_same_instance() {
        let e: Edge<()> = Edge::new(VertexId(3), VertexId(3));
        assert!(e.is_self_loop());
        match e.reverse() {
            Cow::Borrowed(r) => assert!(std::ptr::eq(r, &e)),
            Cow::Owned(_) => panic!("reversed self-loop must be borrowed"),
        }
    }

    #[test]
    fn test_default_edge_weight() {
        let e: Edge<()> = Edge::new(VertexId(0), VertexId(1));
        assert_eq!(e.weight(), Edge::<()>::DEFAULT_WEIGHT);
        assert_eq!(e.id(), None);
    }
}
