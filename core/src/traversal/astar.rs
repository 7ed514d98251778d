use tracing::{debug, trace, warn};

use super::{
    AcceptAll, AlgorithmKind, GraphTraversal, OpenSet, TraversalBase, TraversalCallback,
};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::object::{GraphObject, Vertex, VertexId};

/// The heuristic that never estimates: A* degenerates to Dijkstra with an
/// early exit at the target.
pub fn zero_heuristic<V>(_from: &Vertex<V>, _target: &Vertex<V>) -> f32 {
    0.0
}

/// Goal-directed cheapest path search.
///
/// The heuristic receives the graph's stored vertex and the stored target
/// and must not overestimate the remaining cost for the result to be
/// optimal. It is evaluated at most once per vertex per run.
///
/// A run that exhausts its open set without settling the target fails with
/// [`GraphError::UnreachableTarget`]. A callback returning false stops the
/// run successfully with whatever was settled so far.
pub struct AStar<'g, G: Graph, H, C = AcceptAll> {
    base: TraversalBase<'g, G>,
    target: VertexId,
    heuristic: H,
    callback: C,
    estimates: Vec<Option<f32>>,
    stopped_early: bool,
    reached: bool,
}

impl<'g, G, H> AStar<'g, G, H, AcceptAll>
where
    G: Graph,
    H: Fn(&Vertex<G::VertexData>, &Vertex<G::VertexData>) -> f32,
{
    pub fn new(graph: &'g G, source: VertexId, target: VertexId, heuristic: H) -> Result<Self> {
        let base = TraversalBase::new(graph, source)?;
        if !graph.contains_id(target) {
            return Err(GraphError::VertexNotFound(target));
        }
        Ok(Self {
            base,
            target,
            heuristic,
            callback: AcceptAll,
            estimates: Vec::new(),
            stopped_early: false,
            reached: false,
        })
    }
}

impl<'g, G, H, C> AStar<'g, G, H, C>
where
    G: Graph,
    H: Fn(&Vertex<G::VertexData>, &Vertex<G::VertexData>) -> f32,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    pub fn with_callback<C2>(self, callback: C2) -> AStar<'g, G, H, C2>
    where
        C2: TraversalCallback<G::VertexData, G::EdgeData>,
    {
        let mut base = self.base;
        base.reset();
        AStar {
            base,
            target: self.target,
            heuristic: self.heuristic,
            callback,
            estimates: Vec::new(),
            stopped_early: false,
            reached: false,
        }
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// Whether the last run settled the target.
    pub fn reached_target(&self) -> bool {
        self.reached
    }

    /// Cost of the path found to the target, if any.
    pub fn distance(&self) -> Option<f32> {
        self.base.visited_vertex(self.target).map(|v| v.weight())
    }

    /// The path found to the target; empty if the run did not reach it.
    pub fn target_path(&self) -> Result<Vec<VertexId>> {
        self.base.path(self.target)
    }

    /// Cached heuristic estimate from `id` to the target.
    fn estimate(&mut self, id: VertexId) -> f32 {
        let graph = self.base.graph();
        let Some(slot) = self.estimates.get_mut(id.index()) else {
            return 0.0;
        };
        if let Some(h) = *slot {
            return h;
        }
        let h = match (graph.vertex(id), graph.vertex(self.target)) {
            (Some(from), Some(target)) => (self.heuristic)(from, target),
            _ => 0.0,
        };
        *slot = Some(h);
        h
    }

    fn run(&mut self) {
        let graph = self.base.graph();
        let source = self.base.source();
        let mut open = OpenSet::with_capacity(self.base.capacity());
        let mut settled = vec![false; self.base.capacity()];

        let h = self.estimate(source);
        if let Some(root) = self.base.touch(source) {
            root.set_weight(0.0);
            root.set_level(0);
            open.push(source, h);
        }

        while let Some(u) = open.pop() {
            settled[u.index()] = true;

            let accepted = match self.base.element(u) {
                Some(element) => self.callback.on_traverse(&element),
                None => false,
            };
            if !accepted {
                debug!(vertex = %u, pending = open.len(), "astar: stopped by callback");
                self.stopped_early = true;
                return;
            }
            self.base.mark_visited(u);

            if u == self.target {
                self.reached = true;
                return;
            }

            let (cost, level) = match self.base.local(u) {
                Some(v) => (v.weight(), v.level()),
                None => continue,
            };

            for edge in graph.incident_edges(u) {
                let v = edge.to();
                if settled.get(v.index()).copied().unwrap_or(true) {
                    continue;
                }
                let candidate = cost + edge.weight();
                let improves = self
                    .base
                    .touch(v)
                    .is_some_and(|local| candidate < local.weight());
                if !improves {
                    continue;
                }
                let rank = candidate + self.estimate(v);
                if let Some(local) = self.base.touch(v) {
                    local.set_weight(candidate);
                    local.set_parent(Some(u));
                    local.set_level(level + 1);
                }
                self.base.set_via(v, edge);
                trace!(from = %u, to = %v, cost = candidate, rank, "astar: relaxed");
                open.push(v, rank);
            }
        }
    }
}

impl<G, H, C> GraphTraversal for AStar<'_, G, H, C>
where
    G: Graph,
    H: Fn(&Vertex<G::VertexData>, &Vertex<G::VertexData>) -> f32,
    C: TraversalCallback<G::VertexData, G::EdgeData>,
{
    type VertexData = G::VertexData;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::AStar
    }

    fn source(&self) -> VertexId {
        self.base.source()
    }

    fn execute(&mut self) -> Result<()> {
        self.base.reset();
        self.estimates.clear();
        self.estimates.resize(self.base.capacity(), None);
        self.stopped_early = false;
        self.reached = false;
        self.callback
            .on_begin(&self.base.run_info(AlgorithmKind::AStar, Some(self.target)));
        debug!(source = %self.base.source(), target = %self.target, "astar: starting");

        self.run();

        let summary = self.base.summary(AlgorithmKind::AStar, self.stopped_early);
        debug!(
            visited = summary.visited,
            reached = self.reached,
            stopped_early = self.stopped_early,
            "astar: finished"
        );
        self.callback.on_finish(&summary);

        if self.reached || self.stopped_early {
            Ok(())
        } else {
            warn!(
                source = %self.base.source(),
                target = %self.target,
                visited = summary.visited,
                "astar: open set exhausted before reaching target"
            );
            Err(GraphError::UnreachableTarget {
                start: self.base.source(),
                target: self.target,
            })
        }
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
    use crate::traversal::{Dijkstra, TraversalElement};
    use std::cell::Cell;

    type Grid = AdjacencyList<(i32, i32)>;

    /// Undirected `w x h` grid of unit edges with vertices keyed by
    /// coordinates.
    fn make_grid(w: i32, h: i32) -> Grid {
        let mut g = Grid::undirected();
        for y in 0..h {
            for x in 0..w {
                g.insert_vertex(Vertex::new((x, y)));
            }
        }
        for y in 0..h {
            for x in 0..w {
                let here = g.lookup(&(x, y)).unwrap();
                if x + 1 < w {
                    let right = g.lookup(&(x + 1, y)).unwrap();
                    g.add_edge(Edge::new(here, right)).unwrap();
                }
                if y + 1 < h {
                    let down = g.lookup(&(x, y + 1)).unwrap();
                    g.add_edge(Edge::new(here, down)).unwrap();
                }
            }
        }
        g
    }

    fn manhattan(a: &Vertex<(i32, i32)>, b: &Vertex<(i32, i32)>) -> f32 {
        match (a.payload(), b.payload()) {
            (Some(&(ax, ay)), Some(&(bx, by))) => ((ax - bx).abs() + (ay - by).abs()) as f32,
            _ => 0.0,
        }
    }

    #[test]
    fn test_grid_path_is_optimal() {
        let g = make_grid(6, 6);
        let from = g.lookup(&(0, 0)).unwrap();
        let to = g.lookup(&(5, 3)).unwrap();
        let mut search = AStar::new(&g, from, to, manhattan).unwrap();
        search.execute().unwrap();
        assert!(search.reached_target());
        assert_eq!(search.distance(), Some(8.0));
        let path = search.target_path().unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
    }

    #[test]
    fn test_heuristic_settles_fewer_than_dijkstra() {
        let g = make_grid(10, 10);
        let from = g.lookup(&(0, 0)).unwrap();
        let to = g.lookup(&(9, 0)).unwrap();

        let mut guided = AStar::new(&g, from, to, manhattan).unwrap();
        guided.execute().unwrap();
        let mut blind = Dijkstra::new(&g, from).unwrap();
        blind.execute().unwrap();

        assert_eq!(guided.distance(), blind.distance(to).unwrap());
        assert!(guided.traversal().len() < blind.traversal().len());
    }

    #[test]
    fn test_zero_heuristic_matches_dijkstra() {
        let g = make_grid(4, 4);
        let from = g.lookup(&(0, 0)).unwrap();
        let to = g.lookup(&(3, 3)).unwrap();
        let mut search = AStar::new(&g, from, to, zero_heuristic).unwrap();
        search.execute().unwrap();
        assert_eq!(search.distance(), Some(6.0));
    }

    #[test]
    fn test_heuristic_cached_per_vertex() {
        let g = make_grid(5, 5);
        let from = g.lookup(&(0, 0)).unwrap();
        let to = g.lookup(&(4, 4)).unwrap();
        let calls = Cell::new(0usize);
        let counting = |a: &Vertex<(i32, i32)>, b: &Vertex<(i32, i32)>| {
            calls.set(calls.get() + 1);
            manhattan(a, b)
        };
        let mut search = AStar::new(&g, from, to, counting).unwrap();
        search.execute().unwrap();
        assert!(calls.get() <= g.num_verts());
    }

    #[test]
    fn test_unreachable_target_errors() {
        let mut g = Grid::directed();
        let a = g.insert_vertex(Vertex::new((0, 0)));
        let b = g.insert_vertex(Vertex::new((1, 0)));
        let c = g.insert_vertex(Vertex::new((2, 0)));
        g.add_edge(Edge::new(a, b)).unwrap();
        let mut search = AStar::new(&g, a, c, manhattan).unwrap();
        let err = search.execute().unwrap_err();
        assert_eq!(err, GraphError::UnreachableTarget { start: a, target: c });
        assert!(!search.reached_target());
        assert_eq!(search.traversal(), &[a, b]);
        assert!(search.target_path().unwrap().is_empty());
    }

    #[test]
    fn test_missing_endpoints() {
        let g = make_grid(2, 2);
        let a = g.lookup(&(0, 0)).unwrap();
        assert!(matches!(
            AStar::new(&g, VertexId(40), a, manhattan),
            Err(GraphError::SourceNotInGraph(_))
        ));
        assert!(matches!(
            AStar::new(&g, a, VertexId(40), manhattan),
            Err(GraphError::VertexNotFound(_))
        ));
    }

    #[test]
    fn test_source_is_target() {
        let g = make_grid(3, 3);
        let a = g.lookup(&(1, 1)).unwrap();
        let mut search = AStar::new(&g, a, a, manhattan).unwrap();
        search.execute().unwrap();
        assert_eq!(search.target_path().unwrap(), vec![a]);
        assert_eq!(search.traversal(), &[a]);
    }

    #[test]
    fn test_callback_stop_is_not_an_error() {
        let g = make_grid(4, 4);
        let from = g.lookup(&(0, 0)).unwrap();
        let to = g.lookup(&(3, 3)).unwrap();
        let mut search = AStar::new(&g, from, to, manhattan)
            .unwrap()
            .with_callback(|e: &TraversalElement<'_, (i32, i32), ()>| e.level() < 2);
        search.execute().unwrap();
        assert!(search.stopped_early());
        assert!(!search.reached_target());
        assert_eq!(search.distance(), None);
    }
}
