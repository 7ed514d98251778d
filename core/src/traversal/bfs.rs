use tracing::{debug, trace};

use super::{AcceptAll, AlgorithmKind, GraphTraversal, TraversalBase, TraversalCallback};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{GraphObject, Vertex, VertexId};
use crate::tree::Tree;

/// Breadth-first search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BfsConfig {
    /// Keep exploring through a vertex reached again at the same depth via a
    /// different parent, so every equal-length path gets recorded.
    pub examine_equal_paths: bool,
    /// Stop expanding once this many hops from the source. `None` for no limit.
    pub max_depth: Option<u32>,
}

impl BfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn examine_equal_paths(mut self, enabled: bool) -> Self {
        self.examine_equal_paths = enabled;
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// One way of reaching a vertex: which arrival it came from and at what
/// depth. Outside equal-path mode there is exactly one arrival per visited
/// vertex.
#[derive(Debug, Clone, Copy)]
struct Arrival {
    vertex: VertexId,
    parent: Option<usize>,
    level: u32,
}

/// Level-by-level search from a source vertex.
///
/// Levels count hops; the weight of each visited copy is the summed edge
/// weight along the first path that reached it. A callback returning false
/// excludes that vertex and prunes everything only reachable through it.
pub struct Bfs<'g, G: Graph, C = AcceptAll> {
    base: TraversalBase<'g, G>,
    config: BfsConfig,
    callback: C,
    arrivals: Vec<Arrival>,
}

impl<'g, G: Graph> Bfs<'g, G, AcceptAll> {
    pub fn new(graph: &'g G, source: VertexId) -> Result<Self> {
        Self::with_config(graph, source, BfsConfig::default())
    }

    pub fn with_config(graph: &'g G, source: VertexId, config: BfsConfig) -> Result<Self> {
        Ok(Self {
            base: TraversalBase::new(graph, source)?,
            config,
            callback: AcceptAll,
            arrivals: Vec::new(),
        })
    }
}

impl<'g, G, C> Bfs<'g, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    /// Replace the callback. Results of any previous run are dropped.
    pub fn with_callback<C2>(self, callback: C2) -> Bfs<'g, G, C2>
    where
        C2: TraversalCallback<G::VertexData, G::EdgeData>,
    {
        let mut base = self.base;
        base.reset();
        Bfs {
            base,
            config: self.config,
            callback,
            arrivals: Vec::new(),
        }
    }

    pub fn config(&self) -> &BfsConfig {
        &self.config
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Offer `id` to the callback and record it as visited if accepted.
    fn admit(&mut self, id: VertexId, parent: Option<usize>, level: u32) -> Option<usize> {
        let accepted = match self.base.element(id) {
            Some(element) => self.callback.on_traverse(&element),
            None => false,
        };
        if !accepted {
            trace!(vertex = %id, "bfs: vertex rejected by callback");
            return None;
        }
        self.base.mark_visited(id);
        self.arrivals.push(Arrival {
            vertex: id,
            parent,
            level,
        });
        Some(self.arrivals.len() - 1)
    }

    /// Whether `next` already holds an arrival at `vertex` from the arrival
    /// `from`, as happens with parallel edges.
    fn has_arrival(&self, next: &[usize], vertex: VertexId, from: usize) -> bool {
        next.iter().any(|&i| {
            let arrival = self.arrivals[i];
            arrival.vertex == vertex && arrival.parent == Some(from)
        })
    }

    fn run(&mut self) {
        let graph = self.base.graph();
        let source = self.base.source();

        if let Some(root) = self.base.touch(source) {
            root.set_weight(0.0);
            root.set_level(0);
        }
        let mut frontier: Vec<usize> = self.admit(source, None, 0).into_iter().collect();
        let mut depth = 0u32;

        while !frontier.is_empty() {
            if self.config.max_depth.is_some_and(|max| depth >= max) {
                break;
            }
            let mut next = Vec::new();

            for &index in &frontier {
                let Arrival { vertex: u, parent, .. } = self.arrivals[index];
                let came_from = parent.map(|p| self.arrivals[p].vertex);
                let base_weight = self.base.local(u).map_or(0.0, |v| v.weight());

                for edge in graph.incident_edges(u) {
                    let v = edge.to();
                    // Never step straight back along the edge we arrived by
                    if Some(v) == came_from {
                        continue;
                    }
                    let Some(local) = self.base.touch(v) else {
                        continue;
                    };

                    if !local.is_visited() {
                        local.set_level(depth as i32 + 1);
                        local.set_parent(Some(u));
                        local.set_weight(base_weight + edge.weight());
                        self.base.set_via(v, edge);
                        if let Some(arrival) = self.admit(v, Some(index), depth + 1) {
                            next.push(arrival);
                        }
                    } else if self.config.examine_equal_paths
                        && local.level() == depth as i32 + 1
                        && self.base.is_visited(v)
                        && !self.has_arrival(&next, v, index)
                    {
                        trace!(vertex = %v, via = %u, "bfs: equal-length arrival");
                        self.arrivals.push(Arrival {
                            vertex: v,
                            parent: Some(index),
                            level: depth + 1,
                        });
                        next.push(self.arrivals.len() - 1);
                    }
                }
            }

            frontier = next;
            depth += 1;
        }
    }

    /// Every recorded shortest (hop-count) path from the source to `dest`.
    ///
    /// Holds a single path unless the search ran with
    /// [`BfsConfig::examine_equal_paths`]. Empty when `dest` was not reached.
    pub fn equal_paths(&self, dest: VertexId) -> Result<Vec<Vec<VertexId>>> {
        if !self.base.graph().contains_id(dest) {
            return Err(GraphError::VertexNotFound(dest));
        }
        let paths = self
            .arrivals
            .iter()
            .filter(|a| a.vertex == dest)
            .map(|arrival| {
                let mut path = Vec::with_capacity(arrival.level as usize + 1);
                let mut cursor = Some(*arrival);
                while let Some(a) = cursor {
                    path.push(a.vertex);
                    cursor = a.parent.map(|p| self.arrivals[p]);
                }
                path.reverse();
                path
            })
            .collect();
        Ok(paths)
    }

    /// The BFS tree of the last run: the source at the root, each visited
    /// vertex under the vertex that first reached it.
    pub fn shortest_path_tree(&self) -> Tree<VertexId> {
        let source = self.base.source();
        let mut tree = Tree::new(source);
        let mut nodes = vec![None; self.base.capacity()];
        if let Some(slot) = nodes.get_mut(source.index()) {
            *slot = Some(tree.root());
        }
        // Visit order puts every parent before its children
        for &id in self.base.order().iter().skip(1) {
            let parent_node = self
                .base
                .local(id)
                .and_then(|v| v.parent())
                .and_then(|p| nodes.get(p.index()).copied().flatten());
            if let Some(parent_node) = parent_node {
                nodes[id.index()] = Some(tree.add_child(parent_node, id));
            }
        }
        tree
    }
}

impl<G, C> GraphTraversal for Bfs<'_, G, C>
where
    G: Graph,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    type VertexData = G::VertexData;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Bfs
    }

    fn source(&self) -> VertexId {
        self.base.source()
    }

    fn execute(&mut self) -> Result<()> {
        self.base.reset();
        self.arrivals.clear();
        self.callback
            .on_begin(&self.base.run_info(AlgorithmKind::Bfs, None));
        debug!(
            source = %self.base.source(),
            equal_paths = self.config.examine_equal_paths,
            max_depth = ?self.config.max_depth,
            "bfs: starting"
        );

        self.run();

        let summary = self.base.summary(AlgorithmKind::Bfs, false);
        debug!(
            visited = summary.visited,
            arrivals = self.arrivals.len(),
            "bfs: finished"
        );
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::AdjacencyList;
    use crate::object::Edge;
    use crate::traversal::TraversalElement;

    type G = AdjacencyList<u32>;

    fn make_graph(directed: bool, n: u32, edges: &[(u32, u32)]) -> (G, Vec<VertexId>) {
        let mut g = G::new(directed);
        let ids: Vec<_> = (0..n).map(|i| g.insert_vertex(Vertex::new(i))).collect();
        for &(a, b) in edges {
            g.add_edge(Edge::new(ids[a as usize], ids[b as usize]))
                .unwrap();
        }
        (g, ids)
    }

    /// 0 -> 1 -> 2 -> ... -> n-1
    fn make_chain(n: u32) -> (G, Vec<VertexId>) {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        make_graph(true, n, &edges)
    }

    /// Undirected square 0-1-3, 0-2-3: two equal paths from 0 to 3.
    fn make_diamond() -> (G, Vec<VertexId>) {
        make_graph(false, 4, &[(0, 1), (0, 2), (1, 3), (2, 3)])
    }

    fn run<'g>(g: &'g G, source: VertexId, config: BfsConfig) -> Bfs<'g, G> {
        let mut bfs = Bfs::with_config(g, source, config).unwrap();
        bfs.execute().unwrap();
        bfs
    }

    // --- Basic traversal tests ---

    #[test]
    fn test_chain_order_and_levels() {
        let (g, ids) = make_chain(5);
        let bfs = run(&g, ids[0], BfsConfig::new());
        assert_eq!(bfs.traversal(), ids.as_slice());
        for (i, &id) in ids.iter().enumerate() {
            assert_eq!(bfs.visited_vertex(id).unwrap().level(), i as i32);
        }
        assert_eq!(bfs.path(ids[4]).unwrap(), ids);
    }

    #[test]
    fn test_source_only() {
        let (g, ids) = make_graph(true, 1, &[]);
        let bfs = run(&g, ids[0], BfsConfig::new());
        assert_eq!(bfs.traversal(), &[ids[0]]);
        assert_eq!(bfs.path(ids[0]).unwrap(), vec![ids[0]]);
    }

    #[test]
    fn test_missing_source() {
        let (g, _) = make_chain(2);
        assert!(matches!(
            Bfs::new(&g, VertexId(10)),
            Err(GraphError::SourceNotInGraph(_))
        ));
    }

    #[test]
    fn test_unreached_path_empty() {
        let (g, ids) = make_chain(3);
        let bfs = run(&g, ids[1], BfsConfig::new());
        assert!(bfs.path(ids[0]).unwrap().is_empty());
        assert!(!bfs.is_visited(ids[0]));
        assert!(matches!(
            bfs.path(VertexId(50)),
            Err(GraphError::VertexNotFound(_))
        ));
    }

    #[test]
    fn test_weights_accumulate_along_first_path() {
        let mut g = G::directed();
        let a = g.insert_vertex(Vertex::new(0));
        let b = g.insert_vertex(Vertex::new(1));
        let c = g.insert_vertex(Vertex::new(2));
        g.add_edge(Edge::new(a, b).with_weight(2.5)).unwrap();
        g.add_edge(Edge::new(b, c).with_weight(0.5)).unwrap();
        let bfs = run(&g, a, BfsConfig::new());
        assert_eq!(bfs.visited_vertex(c).unwrap().weight(), 3.0);
        assert_eq!(bfs.visited_vertex(a).unwrap().weight(), 0.0);
    }

    #[test]
    fn test_graph_vertices_untouched() {
        let (g, ids) = make_chain(3);
        let _ = run(&g, ids[0], BfsConfig::new());
        for id in ids {
            let v = g.vertex(id).unwrap();
            assert!(!v.is_visited());
            assert_eq!(v.parent(), None);
        }
    }

    #[test]
    fn test_execute_twice_is_stable() {
        let (g, ids) = make_diamond();
        let mut bfs = Bfs::new(&g, ids[0]).unwrap();
        bfs.execute().unwrap();
        let first = bfs.traversal().to_vec();
        bfs.execute().unwrap();
        assert_eq!(bfs.traversal(), first.as_slice());
    }

    #[test]
    fn test_max_depth() {
        let (g, ids) = make_chain(6);
        let bfs = run(&g, ids[0], BfsConfig::new().max_depth(2));
        assert_eq!(bfs.traversal(), &ids[..3]);
    }

    #[test]
    fn test_self_loop_and_cycle() {
        let (g, ids) = make_graph(true, 3, &[(0, 0), (0, 1), (1, 2), (2, 0)]);
        let bfs = run(&g, ids[0], BfsConfig::new());
        assert_eq!(bfs.traversal(), ids.as_slice());
    }

    // --- Equal path tests ---

    #[test]
    fn test_single_path_without_equal_mode() {
        let (g, ids) = make_diamond();
        let bfs = run(&g, ids[0], BfsConfig::new());
        let paths = bfs.equal_paths(ids[3]).unwrap();
        assert_eq!(paths, vec![vec![ids[0], ids[1], ids[3]]]);
    }

    #[test]
    fn test_equal_paths_recorded() {
        let (g, ids) = make_diamond();
        let bfs = run(&g, ids[0], BfsConfig::new().examine_equal_paths(true));
        let mut paths = bfs.equal_paths(ids[3]).unwrap();
        paths.sort();
        assert_eq!(
            paths,
            vec![vec![ids[0], ids[1], ids[3]], vec![ids[0], ids[2], ids[3]]]
        );
        // The visit order still lists each vertex once
        assert_eq!(bfs.traversal().len(), 4);
    }

    #[test]
    fn test_equal_paths_propagate_downstream() {
        // diamond with a tail 3 -> 4: both routes continue to 4
        let (g, ids) = make_graph(true, 5, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]);
        let bfs = run(&g, ids[0], BfsConfig::new().examine_equal_paths(true));
        assert_eq!(bfs.equal_paths(ids[4]).unwrap().len(), 2);
    }

    #[test]
    fn test_longer_arrival_not_recorded() {
        // 0 -> 1 -> 2 and 0 -> 2: only the direct path is shortest
        let (g, ids) = make_graph(true, 3, &[(0, 1), (1, 2), (0, 2)]);
        let bfs = run(&g, ids[0], BfsConfig::new().examine_equal_paths(true));
        assert_eq!(bfs.equal_paths(ids[2]).unwrap(), vec![vec![ids[0], ids[2]]]);
    }

    #[test]
    fn test_parallel_edges_single_arrival() {
        let mut g = AdjacencyList::<u32, u8>::directed();
        let a = g.insert_vertex(Vertex::new(0));
        let b = g.insert_vertex(Vertex::new(1));
        g.add_edge(Edge::new(a, b).with_payload(1)).unwrap();
        g.add_edge(Edge::new(a, b).with_payload(2)).unwrap();
        let mut bfs = Bfs::with_config(&g, a, BfsConfig::new().examine_equal_paths(true)).unwrap();
        bfs.execute().unwrap();
        assert_eq!(bfs.equal_paths(b).unwrap().len(), 1);
    }

    // --- Callback tests ---

    #[test]
    fn test_callback_prunes_subtree() {
        // 0 -> 1 -> 3, 0 -> 2; rejecting 1 hides 3
        let (g, ids) = make_graph(true, 4, &[(0, 1), (0, 2), (1, 3)]);
        let rejected = ids[1];
        let mut bfs = Bfs::new(&g, ids[0])
            .unwrap()
            .with_callback(move |e: &TraversalElement<'_, u32, ()>| e.id != rejected);
        bfs.execute().unwrap();
        assert_eq!(bfs.traversal(), &[ids[0], ids[2]]);
        assert!(bfs.path(ids[3]).unwrap().is_empty());
    }

    #[test]
    fn test_callback_sees_edges_and_levels() {
        let (g, ids) = make_chain(3);
        let mut seen = Vec::new();
        let mut bfs = Bfs::new(&g, ids[0])
            .unwrap()
            .with_callback(|e: &TraversalElement<'_, u32, ()>| {
                seen.push((e.id, e.level(), e.edge.map(|edge| edge.from())));
                true
            });
        bfs.execute().unwrap();
        drop(bfs);
        assert_eq!(
            seen,
            vec![
                (ids[0], 0, None),
                (ids[1], 1, Some(ids[0])),
                (ids[2], 2, Some(ids[1])),
            ]
        );
    }

    #[test]
    fn test_rejected_source_visits_nothing() {
        let (g, ids) = make_chain(3);
        let mut bfs = Bfs::new(&g, ids[0])
            .unwrap()
            .with_callback(|_: &TraversalElement<'_, u32, ()>| false);
        bfs.execute().unwrap();
        assert!(bfs.traversal().is_empty());
    }

    // --- Tree tests ---

    #[test]
    fn test_shortest_path_tree() {
        // 0 -> {1, 2}, 1 -> 3
        let (g, ids) = make_graph(true, 4, &[(0, 1), (0, 2), (1, 3)]);
        let bfs = run(&g, ids[0], BfsConfig::new());
        let tree = bfs.shortest_path_tree();
        assert_eq!(tree.len(), 4);
        assert_eq!(*tree.value(tree.root()), ids[0]);
        let mut children: Vec<_> = tree
            .children(tree.root())
            .iter()
            .map(|&n| *tree.value(n))
            .collect();
        children.sort();
        assert_eq!(children, vec![ids[1], ids[2]]);
        let pre: Vec<_> = tree.pre_order().map(|n| *tree.value(n)).collect();
        assert_eq!(pre, vec![ids[0], ids[1], ids[3], ids[2]]);
    }
}
