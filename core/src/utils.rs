//! Derived graph algorithms built on the public graph and traversal API:
//! sources, connectivity, induced subgraphs, diffs, path pruning, degree
//! ranking and heuristic directed-ization.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::adjacency::AdjacencyList;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{Edge, EdgeId, GraphObject, Vertex, VertexId};
use crate::traversal::{Bfs, GraphTraversal, TraversalElement};

/// Every vertex of a directed graph that is the target of no edge.
///
/// Self-loops count as incoming edges.
pub fn find_sources<G: Graph>(graph: &G) -> Result<Vec<VertexId>> {
    if !graph.is_directed() {
        return Err(GraphError::RequiresDirected);
    }
    let targets: HashSet<VertexId> = graph.edges().map(|e| e.to()).collect();
    Ok(graph.vertex_ids().filter(|id| !targets.contains(id)).collect())
}

/// The unique source of a directed graph, or `None` when there is no
/// source or more than one.
pub fn find_source<G: Graph>(graph: &G) -> Result<Option<VertexId>> {
    let sources = find_sources(graph)?;
    Ok(match sources.as_slice() {
        [only] => Some(*only),
        _ => None,
    })
}

/// Vertices reachable from `source`, following edge direction.
fn reachable<G: Graph>(graph: &G, source: VertexId) -> Result<Vec<VertexId>> {
    let mut bfs = Bfs::new(graph, source)?;
    bfs.execute()?;
    Ok(bfs.traversal().to_vec())
}

/// Whether one BFS from the first vertex reaches every vertex.
///
/// Edge direction is respected, so a directed graph is "connected" only if
/// everything is reachable from its first vertex. Graphs with fewer than
/// two vertices are connected.
pub fn is_connected<G: Graph>(graph: &G) -> bool {
    let Some(first) = graph.vertex_ids().next() else {
        return true;
    };
    reachable(graph, first).is_ok_and(|seen| seen.len() == graph.num_verts())
}

/// A new graph of the same directedness holding copies of `vertices` and
/// every edge with both endpoints among them. Handles are not preserved.
pub fn induced_subgraph<G, I>(graph: &G, vertices: I) -> G
where
    G: Graph,
    I: IntoIterator<Item = VertexId>,
{
    let mut sub = graph.empty_like();
    let mut remap: HashMap<VertexId, VertexId> = HashMap::new();
    for id in vertices {
        if let Some(vertex) = graph.vertex(id) {
            remap.insert(id, sub.insert_vertex(vertex.clone()));
        }
    }
    for edge in graph.logical_edges() {
        if let (Some(&from), Some(&to)) = (remap.get(&edge.from()), remap.get(&edge.to())) {
            let added = sub.add_edge(copy_edge(edge, from, to));
            debug_assert!(added.is_ok(), "induced edge endpoints were inserted above");
        }
    }
    sub
}

fn copy_edge<E: Clone>(edge: &Edge<E>, from: VertexId, to: VertexId) -> Edge<E> {
    let mut copy = edge.clone();
    copy.rebind(from, to);
    copy.set_id(None);
    copy
}

/// Partition the vertices into components, one induced subgraph each.
///
/// Each component is grown by a BFS from the first unassigned vertex that
/// does not enter vertices already assigned to an earlier component. On an
/// undirected graph these are the connected components; on a directed one
/// the result is a partition by forward reachability in vertex order, with
/// exactly one part iff [`is_connected`] holds.
pub fn connected_components<G: Graph>(graph: &G) -> Vec<G> {
    component_ids(graph, None)
        .into_iter()
        .map(|members| induced_subgraph(graph, members))
        .collect()
}

/// Vertex sets of the components, in discovery order. With `stop_above`
/// set, stops as soon as one component is larger than that.
fn component_ids<G: Graph>(graph: &G, stop_above: Option<usize>) -> Vec<Vec<VertexId>> {
    let mut assigned: HashSet<VertexId> = HashSet::with_capacity(graph.num_verts());
    let mut components = Vec::new();

    for start in graph.vertex_ids() {
        if assigned.contains(&start) {
            continue;
        }
        let taken = &assigned;
        let skip_assigned =
            |e: &TraversalElement<'_, G::VertexData, G::EdgeData>| !taken.contains(&e.id);
        let members = match Bfs::new(graph, start) {
            Ok(bfs) => {
                let mut bfs = bfs.with_callback(skip_assigned);
                match bfs.execute() {
                    Ok(()) => bfs.traversal().to_vec(),
                    Err(_) => vec![start],
                }
            }
            Err(_) => continue,
        };
        assigned.extend(members.iter().copied());
        let size = members.len();
        components.push(members);
        if stop_above.is_some_and(|limit| size > limit) {
            break;
        }
    }
    components
}

/// The largest connected component, ignoring edge direction, as an induced
/// subgraph of `graph` (so directed edges stay directed).
///
/// The search stops early once a component holds more than half of the
/// vertices, since no other component can be larger. Ties go to the
/// component found first.
pub fn largest_connected_subgraph<G: Graph>(graph: &G) -> G {
    let view = graph.make_undirected();
    let half = graph.num_verts() / 2;
    let components = component_ids(&*view, Some(half));
    let largest = components
        .into_iter()
        .reduce(|best, c| if c.len() > best.len() { c } else { best });
    debug!(
        vertices = graph.num_verts(),
        largest = largest.as_ref().map_or(0, Vec::len),
        "largest connected subgraph"
    );
    match largest {
        // The undirected view shares handles with `graph`
        Some(members) => induced_subgraph(graph, members),
        None => graph.empty_like(),
    }
}

/// Vertices with no path to or from `source`, ignoring edge direction.
pub fn vertices_not_connected_to_source<G: Graph>(
    graph: &G,
    source: VertexId,
) -> Result<Vec<VertexId>> {
    let view = graph.make_undirected();
    let connected: HashSet<VertexId> = reachable(&*view, source)?.into_iter().collect();
    Ok(graph
        .vertex_ids()
        .filter(|id| !connected.contains(id))
        .collect())
}

/// Selects which parts of a [`GraphDiff`] to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffParts {
    pub added_vertices: bool,
    pub removed_vertices: bool,
    pub added_edges: bool,
    pub removed_edges: bool,
}

impl DiffParts {
    pub fn all() -> Self {
        Self {
            added_vertices: true,
            removed_vertices: true,
            added_edges: true,
            removed_edges: true,
        }
    }

    pub fn vertices() -> Self {
        Self {
            added_vertices: true,
            removed_vertices: true,
            ..Self::default()
        }
    }

    pub fn edges() -> Self {
        Self {
            added_edges: true,
            removed_edges: true,
            ..Self::default()
        }
    }
}

/// A graph-independent description of an edge: endpoint payloads instead
/// of handles, so edges from different graphs can be compared.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView<V, E> {
    pub from: Option<V>,
    pub to: Option<V>,
    pub payload: Option<E>,
    pub weight: f32,
}

impl<V: Clone, E: Clone> EdgeView<V, E> {
    fn of<G>(graph: &G, edge: &Edge<E>) -> Self
    where
        G: Graph<VertexData = V, EdgeData = E>,
    {
        let payload_of = |id| graph.vertex(id).and_then(|v| v.payload().cloned());
        Self {
            from: payload_of(edge.from()),
            to: payload_of(edge.to()),
            payload: edge.payload().cloned(),
            weight: edge.weight(),
        }
    }
}

/// Membership differences between two graphs. A part is `None` when it was
/// not requested.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDiff<V, E> {
    /// Vertices of the second graph missing from the first.
    pub added_vertices: Option<Vec<Vertex<V>>>,
    /// Vertices of the first graph missing from the second.
    pub removed_vertices: Option<Vec<Vertex<V>>>,
    pub added_edges: Option<Vec<EdgeView<V, E>>>,
    pub removed_edges: Option<Vec<EdgeView<V, E>>>,
}

impl<V, E> GraphDiff<V, E> {
    /// True when every computed part is empty.
    pub fn is_empty(&self) -> bool {
        self.added_vertices.as_ref().map_or(true, Vec::is_empty)
            && self.removed_vertices.as_ref().map_or(true, Vec::is_empty)
            && self.added_edges.as_ref().map_or(true, Vec::is_empty)
            && self.removed_edges.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Compare two graphs by membership.
///
/// Vertices match by payload. Edges match by endpoint payloads plus edge
/// payload; weights are ignored. Each undirected edge is reported once.
pub fn graph_diff<G: Graph>(
    before: &G,
    after: &G,
    parts: DiffParts,
) -> GraphDiff<G::VertexData, G::EdgeData> {
    let diff = GraphDiff {
        added_vertices: parts
            .added_vertices
            .then(|| vertices_missing_from(after, before)),
        removed_vertices: parts
            .removed_vertices
            .then(|| vertices_missing_from(before, after)),
        added_edges: parts.added_edges.then(|| edges_missing_from(after, before)),
        removed_edges: parts
            .removed_edges
            .then(|| edges_missing_from(before, after)),
    };
    debug!(
        added_vertices = diff.added_vertices.as_ref().map(Vec::len),
        removed_vertices = diff.removed_vertices.as_ref().map(Vec::len),
        added_edges = diff.added_edges.as_ref().map(Vec::len),
        removed_edges = diff.removed_edges.as_ref().map(Vec::len),
        "graph diff"
    );
    diff
}

/// Vertices of `from` that `other` does not contain.
fn vertices_missing_from<G: Graph>(from: &G, other: &G) -> Vec<Vertex<G::VertexData>> {
    from.vertices()
        .filter(|(_, v)| !other.contains_vertex(v))
        .map(|(_, v)| v.clone())
        .collect()
}

/// Logical edges of `from` that `other` does not contain.
fn edges_missing_from<G: Graph>(from: &G, other: &G) -> Vec<EdgeView<G::VertexData, G::EdgeData>> {
    from.logical_edges()
        .filter(|edge| !contains_equivalent_edge(from, edge, other))
        .map(|edge| EdgeView::of(from, edge))
        .collect()
}

fn contains_equivalent_edge<G: Graph>(graph: &G, edge: &Edge<G::EdgeData>, other: &G) -> bool {
    let endpoint = |id| {
        graph
            .vertex(id)
            .and_then(|v| other.vertex_id(v.payload()))
    };
    match (endpoint(edge.from()), endpoint(edge.to())) {
        (Some(from), Some(to)) => other.contains_edge(&copy_edge(edge, from, to)),
        _ => false,
    }
}

/// Drop every path that occurs as a contiguous run inside a strictly longer
/// path of the input.
///
/// Quadratic in the number of paths. Order and duplicates of the surviving
/// paths are kept, so applying it twice changes nothing.
pub fn remove_path_subsets<T: PartialEq + Clone>(paths: &[Vec<T>]) -> Vec<Vec<T>> {
    paths
        .iter()
        .filter(|path| !paths.iter().any(|other| is_strict_subpath(path, other)))
        .cloned()
        .collect()
}

/// Whether `short` appears contiguously in `long` and is shorter.
fn is_strict_subpath<T: PartialEq>(short: &[T], long: &[T]) -> bool {
    if short.len() >= long.len() {
        return false;
    }
    short.is_empty() || long.windows(short.len()).any(|w| w == short)
}

/// Degree counts for one vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeResult {
    pub id: VertexId,
    pub out_degree: usize,
    pub in_degree: usize,
    /// Sum of both, except on undirected graphs where every edge is both
    /// incoming and outgoing and counts once.
    pub total_degree: usize,
}

/// Vertices ranked by total degree, highest first, ties by handle.
///
/// `top_n == 0` returns every vertex.
pub fn degree_centrality<G: Graph>(graph: &G, top_n: usize) -> Vec<DegreeResult> {
    let mut incoming: HashMap<VertexId, usize> = HashMap::new();
    for edge in graph.edges() {
        *incoming.entry(edge.to()).or_default() += 1;
    }

    let mut results: Vec<DegreeResult> = graph
        .vertex_ids()
        .map(|id| {
            let out_degree = graph.incident_edges(id).count();
            let in_degree = incoming.get(&id).copied().unwrap_or(0);
            let total_degree = if graph.is_directed() {
                out_degree + in_degree
            } else {
                out_degree
            };
            DegreeResult {
                id,
                out_degree,
                in_degree,
                total_degree,
            }
        })
        .collect();

    results.sort_by(|a, b| b.total_degree.cmp(&a.total_degree).then(a.id.cmp(&b.id)));
    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }
    results
}

/// Heuristically orient a graph into a simple directed graph.
///
/// 1. A BFS from each of `sources` over the undirected view orients its
///    shortest-path tree edges away from that source.
/// 2. Edges no tree used are collected.
/// 3. Those are grouped into chains: each chain starts at the endpoint
///    closest (in BFS levels) to any source and greedily follows untouched
///    edges, oriented in walking order.
/// 4. The result holds every vertex plus the tree and chain edges.
///
/// The first orientation given to a vertex pair wins; self-loops and
/// parallel edges are dropped. Vertices unreachable from every source still
/// get their edges, through the chain phase. The heuristic does not try to
/// avoid cycles among chain edges.
pub fn make_directional<G: Graph>(
    graph: &G,
    sources: &[VertexId],
) -> Result<AdjacencyList<G::VertexData, G::EdgeData>> {
    for &source in sources {
        if !graph.contains_id(source) {
            return Err(GraphError::SourceNotInGraph(source));
        }
    }
    let undirected = graph.make_undirected();
    let view: &G = &undirected;

    let mut out = AdjacencyList::with_capacity(true, graph.num_verts());
    let mut remap: HashMap<VertexId, VertexId> = HashMap::with_capacity(graph.num_verts());
    for (id, vertex) in graph.vertices() {
        remap.insert(id, out.insert_vertex(vertex.clone()));
    }

    let mut oriented = Orientation::new(&remap);
    let mut level: HashMap<VertexId, i32> = HashMap::new();

    // Phase 1: shortest-path trees
    for &source in sources {
        let mut bfs = Bfs::new(view, source)?;
        bfs.execute()?;
        let tree = bfs.shortest_path_tree();
        for node in tree.pre_order() {
            let child = *tree.value(node);
            if let Some(v) = bfs.visited_vertex(child) {
                let best = level.entry(child).or_insert(v.level());
                *best = (*best).min(v.level());
            }
            let Some(parent) = tree.parent(node).map(|p| *tree.value(p)) else {
                continue;
            };
            if let Some(edge) = view.find_edge(parent, child) {
                oriented.mark(edge);
                oriented.add(&mut out, edge, parent, child);
            }
        }
    }
    let tree_edges = out.num_edges();

    // Phase 2: leftovers
    let mut untouched: Vec<&Edge<G::EdgeData>> = view
        .logical_edges()
        .filter(|e| !oriented.is_marked(e))
        .collect();

    // Phase 3: chains, started from the endpoint nearest a source
    let rank = |id: VertexId| level.get(&id).copied().unwrap_or(i32::MAX);
    untouched.sort_by_key(|e| rank(e.from()).min(rank(e.to())));
    for &seed in &untouched {
        if oriented.is_marked(seed) {
            continue;
        }
        let (mut current, mut next) = if rank(seed.to()) < rank(seed.from()) {
            (seed.to(), seed.from())
        } else {
            (seed.from(), seed.to())
        };
        let mut edge = seed;
        loop {
            oriented.mark(edge);
            oriented.add(&mut out, edge, current, next);
            current = next;
            let Some(step) = view
                .incident_edges(current)
                .find(|e| !oriented.is_marked(e))
            else {
                break;
            };
            edge = step;
            next = step.to();
        }
    }

    debug!(
        sources = sources.len(),
        tree_edges,
        chain_edges = out.num_edges() - tree_edges,
        "make directional"
    );
    Ok(out)
}

/// Book-keeping for [`make_directional`]: which input edges were consumed
/// and which vertex pairs already carry an output edge.
struct Orientation<'a> {
    remap: &'a HashMap<VertexId, VertexId>,
    used: HashSet<EdgeKey>,
    pairs: HashSet<(VertexId, VertexId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    Id(EdgeId),
    Pair(VertexId, VertexId),
}

impl<'a> Orientation<'a> {
    fn new(remap: &'a HashMap<VertexId, VertexId>) -> Self {
        Self {
            remap,
            used: HashSet::new(),
            pairs: HashSet::new(),
        }
    }

    fn key<E>(edge: &Edge<E>) -> EdgeKey {
        match edge.id() {
            Some(id) => EdgeKey::Id(id),
            None => {
                let (a, b) = edge.endpoints();
                EdgeKey::Pair(a.min(b), a.max(b))
            }
        }
    }

    fn mark<E>(&mut self, edge: &Edge<E>) {
        self.used.insert(Self::key(edge));
    }

    fn is_marked<E>(&self, edge: &Edge<E>) -> bool {
        self.used.contains(&Self::key(edge))
    }

    /// Add `from -> to` to `out` unless it is a self-loop or the pair is
    /// already oriented either way.
    fn add<V, E>(
        &mut self,
        out: &mut AdjacencyList<V, E>,
        edge: &Edge<E>,
        from: VertexId,
        to: VertexId,
    ) where
        V: Eq + std::hash::Hash + Clone,
        E: PartialEq + Clone,
    {
        if from == to {
            return;
        }
        let (Some(&a), Some(&b)) = (self.remap.get(&from), self.remap.get(&to)) else {
            return;
        };
        if self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a)) {
            return;
        }
        let mut copy = copy_edge(edge, a, b);
        copy.set_reversed(false);
        let added = out.add_edge(copy);
        debug_assert!(added.is_ok(), "oriented edge endpoints are copied first");
        if matches!(added, Ok(true)) {
            self.pairs.insert((a, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type G = AdjacencyList<u32>;

    fn make_graph(directed: bool, n: u32, edges: &[(u32, u32)]) -> (G, Vec<VertexId>) {
        let mut g = G::new(directed);
        let ids: Vec<_> = (0..n).map(|i| g.insert_vertex(Vertex::new(i))).collect();
        for &(a, b) in edges {
            g.add_edge(Edge::new(ids[a as usize], ids[b as usize])).unwrap();
        }
        (g, ids)
    }

    fn payloads(g: &G) -> Vec<u32> {
        let mut out: Vec<u32> = g
            .vertices()
            .filter_map(|(_, v)| v.payload().copied())
            .collect();
        out.sort_unstable();
        out
    }

    // --- Source tests ---

    #[test]
    fn test_find_source_unique() {
        let (g, ids) = make_graph(true, 4, &[(0, 1), (1, 2), (0, 3)]);
        assert_eq!(find_source(&g).unwrap(), Some(ids[0]));
        assert_eq!(find_sources(&g).unwrap(), vec![ids[0]]);
    }

    #[test]
    fn test_find_source_ambiguous() {
        let (g, ids) = make_graph(true, 3, &[(0, 2), (1, 2)]);
        assert_eq!(find_sources(&g).unwrap(), vec![ids[0], ids[1]]);
        assert_eq!(find_source(&g).unwrap(), None);
    }

    #[test]
    fn test_find_source_cycle_has_none() {
        let (g, _) = make_graph(true, 3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(find_source(&g).unwrap(), None);
    }

    #[test]
    fn test_find_source_requires_directed() {
        let (g, _) = make_graph(false, 2, &[(0, 1)]);
        assert_eq!(find_source(&g).unwrap_err(), GraphError::RequiresDirected);
    }

    // --- Connectivity tests ---

    #[test]
    fn test_is_connected() {
        let (g, _) = make_graph(false, 4, &[(0, 1), (1, 2), (2, 3)]);
        assert!(is_connected(&g));
        let (g, _) = make_graph(false, 4, &[(0, 1), (2, 3)]);
        assert!(!is_connected(&g));
        assert!(is_connected(&G::undirected()));
    }

    #[test]
    fn test_is_connected_respects_direction() {
        let (g, _) = make_graph(true, 3, &[(0, 1), (0, 2)]);
        assert!(is_connected(&g));
        let (g, _) = make_graph(true, 3, &[(1, 0), (1, 2)]);
        assert!(!is_connected(&g));
    }

    #[test]
    fn test_components_partition() {
        let (g, _) = make_graph(false, 7, &[(0, 1), (1, 2), (3, 4), (5, 5)]);
        let components = connected_components(&g);
        let sizes: Vec<_> = components.iter().map(Graph::num_verts).collect();
        assert_eq!(sizes, vec![3, 2, 1, 1]);
        let mut all: Vec<u32> = components.iter().flat_map(payloads).collect();
        all.sort_unstable();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
        // Edges come along with their component
        assert_eq!(components[0].num_edges(), 2);
        assert_eq!(components[2].num_edges(), 1);
    }

    #[test]
    fn test_components_directed_single_iff_connected() {
        let (g, _) = make_graph(true, 3, &[(1, 0), (1, 2)]);
        let components = connected_components(&g);
        assert!(components.len() > 1);
        assert!(!is_connected(&g));
        let total: usize = components.iter().map(Graph::num_verts).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_largest_connected_subgraph_ignores_direction() {
        // 0 <- 1 -> 2 is one weak component; 3 -> 4 another
        let (g, _) = make_graph(true, 5, &[(1, 0), (1, 2), (3, 4)]);
        let largest = largest_connected_subgraph(&g);
        assert_eq!(payloads(&largest), vec![0, 1, 2]);
        assert!(largest.is_directed());
        assert_eq!(largest.num_edges(), 2);
    }

    #[test]
    fn test_largest_connected_subgraph_empty() {
        let largest = largest_connected_subgraph(&G::directed());
        assert_eq!(largest.num_verts(), 0);
    }

    #[test]
    fn test_vertices_not_connected_to_source() {
        let (g, ids) = make_graph(true, 5, &[(1, 0), (1, 2), (3, 4)]);
        let lonely = vertices_not_connected_to_source(&g, ids[0]).unwrap();
        assert_eq!(lonely, vec![ids[3], ids[4]]);
        assert!(vertices_not_connected_to_source(&g, VertexId(9)).is_err());
    }

    #[test]
    fn test_induced_subgraph() {
        let (g, ids) = make_graph(true, 4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let sub = induced_subgraph(&g, [ids[0], ids[1], ids[2]]);
        assert_eq!(sub.num_verts(), 3);
        assert_eq!(sub.num_edges(), 2);
    }

    #[test]
    fn test_induced_subgraph_keeps_undirected_and_loop_edges() {
        let (g, ids) = make_graph(false, 4, &[(0, 1), (1, 2), (2, 2), (2, 3)]);
        let sub = induced_subgraph(&g, [ids[1], ids[2], ids[3]]);
        assert!(!sub.is_directed());
        assert_eq!(sub.num_verts(), 3);
        // 1-2, the loop on 2 and 2-3
        assert_eq!(sub.num_edges(), 3);
        let two = sub.lookup(&2).unwrap();
        let three = sub.lookup(&3).unwrap();
        assert!(sub.find_edge(three, two).is_some());
        assert!(sub.find_edge(two, two).is_some());
    }

    // --- Diff tests ---

    #[test]
    fn test_diff_identical_is_empty() {
        let (g, _) = make_graph(false, 4, &[(0, 1), (1, 2), (2, 3)]);
        let diff = graph_diff(&g, &g.clone(), DiffParts::all());
        assert!(diff.is_empty());
        assert_eq!(diff.added_edges, Some(Vec::new()));
    }

    #[test]
    fn test_diff_reports_changes() {
        let (before, _) = make_graph(true, 3, &[(0, 1), (1, 2)]);
        let mut after = before.clone();
        let zero = after.lookup(&0).unwrap();
        let two = after.lookup(&2).unwrap();
        after.remove_vertex(after.lookup(&1).unwrap());
        let three = after.insert_vertex(Vertex::new(3));
        after.add_edge(Edge::new(zero, two)).unwrap();
        after.add_edge(Edge::new(two, three)).unwrap();

        let diff = graph_diff(&before, &after, DiffParts::all());
        let added: Vec<_> = diff
            .added_vertices
            .unwrap()
            .iter()
            .filter_map(|v| v.payload().copied())
            .collect();
        assert_eq!(added, vec![3]);
        assert_eq!(diff.removed_vertices.unwrap().len(), 1);
        let added_edges: Vec<_> = diff
            .added_edges
            .unwrap()
            .into_iter()
            .map(|e| (e.from, e.to))
            .collect();
        assert_eq!(added_edges, vec![(Some(0), Some(2)), (Some(2), Some(3))]);
        assert_eq!(diff.removed_edges.unwrap().len(), 2);
    }

    #[test]
    fn test_diff_matches_by_payload_not_handle() {
        // Same graph built in opposite insertion order
        let (a, _) = make_graph(false, 3, &[(0, 1), (1, 2)]);
        let mut b = G::undirected();
        let h2 = b.insert_vertex(Vertex::new(2));
        let h1 = b.insert_vertex(Vertex::new(1));
        let h0 = b.insert_vertex(Vertex::new(0));
        b.add_edge(Edge::new(h2, h1)).unwrap();
        b.add_edge(Edge::new(h1, h0)).unwrap();
        assert!(graph_diff(&a, &b, DiffParts::all()).is_empty());
    }

    #[test]
    fn test_diff_skips_unrequested_parts() {
        let (a, _) = make_graph(true, 2, &[(0, 1)]);
        let b = G::directed();
        let diff = graph_diff(&a, &b, DiffParts::vertices());
        assert!(diff.added_edges.is_none());
        assert!(diff.removed_edges.is_none());
        assert_eq!(diff.removed_vertices.map(|v| v.len()), Some(2));
    }

    // --- Path subset tests ---

    #[test]
    fn test_remove_path_subsets() {
        let paths = vec![
            vec![1, 2, 3, 4],
            vec![2, 3],
            vec![1, 3],
            vec![3, 4],
            vec![5],
            vec![4, 5],
        ];
        let kept = remove_path_subsets(&paths);
        assert_eq!(kept, vec![vec![1, 2, 3, 4], vec![1, 3], vec![4, 5]]);
        assert_eq!(remove_path_subsets(&kept), kept);
    }

    #[test]
    fn test_remove_path_subsets_keeps_duplicates() {
        let paths = vec![vec![1, 2], vec![1, 2]];
        assert_eq!(remove_path_subsets(&paths), paths);
    }

    #[test]
    fn test_remove_path_subsets_empty_path() {
        let paths: Vec<Vec<u8>> = vec![vec![], vec![7]];
        assert_eq!(remove_path_subsets(&paths), vec![vec![7]]);
        assert!(remove_path_subsets::<u8>(&[]).is_empty());
    }

    // --- Degree tests ---

    #[test]
    fn test_degree_centrality_star() {
        let (g, ids) = make_graph(true, 5, &[(0, 1), (0, 2), (0, 3), (4, 0)]);
        let ranked = degree_centrality(&g, 0);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].id, ids[0]);
        assert_eq!((ranked[0].out_degree, ranked[0].in_degree), (3, 1));
        assert_eq!(ranked[0].total_degree, 4);
        // Leaves tie at 1, ordered by handle
        let rest: Vec<_> = ranked[1..].iter().map(|r| r.id).collect();
        assert_eq!(rest, vec![ids[1], ids[2], ids[3], ids[4]]);
    }

    #[test]
    fn test_degree_centrality_top_n_undirected() {
        let (g, ids) = make_graph(false, 3, &[(0, 1), (1, 2)]);
        let top = degree_centrality(&g, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, ids[1]);
        assert_eq!(top[0].total_degree, 2);
    }

    // --- Directional tests ---

    #[test]
    fn test_make_directional_tree_edges_point_away() {
        let (g, ids) = make_graph(false, 4, &[(1, 0), (1, 2), (3, 2)]);
        let d = make_directional(&g, &[ids[0]]).unwrap();
        assert!(d.is_directed());
        assert_eq!(d.num_verts(), 4);
        assert_eq!(d.num_edges(), 3);
        assert!(d.find_edge(ids[0], ids[1]).is_some());
        assert!(d.find_edge(ids[1], ids[2]).is_some());
        assert!(d.find_edge(ids[2], ids[3]).is_some());
        assert_eq!(find_source(&d).unwrap(), Some(ids[0]));
    }

    #[test]
    fn test_make_directional_cycle_edge_becomes_chain() {
        // Triangle 0-1-2: BFS from 0 uses 0-1 and 0-2, leaving 1-2
        let (g, ids) = make_graph(false, 3, &[(0, 1), (0, 2), (1, 2)]);
        let d = make_directional(&g, &[ids[0]]).unwrap();
        assert_eq!(d.num_edges(), 3);
        assert!(d.find_edge(ids[1], ids[2]).is_some() || d.find_edge(ids[2], ids[1]).is_some());
        assert!(d.find_edge(ids[1], ids[0]).is_none());
    }

    #[test]
    fn test_make_directional_drops_loops_and_keeps_isolated() {
        let (g, ids) = make_graph(false, 4, &[(0, 1), (1, 1)]);
        let d = make_directional(&g, &[ids[0]]).unwrap();
        assert_eq!(d.num_verts(), 4);
        assert_eq!(d.num_edges(), 1);
        assert_eq!(d.out_degree(ids[3]), 0);
    }

    #[test]
    fn test_make_directional_unreached_component() {
        let (g, ids) = make_graph(false, 5, &[(0, 1), (2, 3), (3, 4)]);
        let d = make_directional(&g, &[ids[0]]).unwrap();
        assert_eq!(d.num_edges(), 3);
        // The chain through 2-3-4 is walked in one direction
        assert!(d.find_edge(ids[2], ids[3]).is_some());
        assert!(d.find_edge(ids[3], ids[4]).is_some());
    }

    #[test]
    fn test_make_directional_missing_source() {
        let (g, _) = make_graph(false, 2, &[(0, 1)]);
        assert!(matches!(
            make_directional(&g, &[VertexId(8)]),
            Err(GraphError::SourceNotInGraph(_))
        ));
    }
}
