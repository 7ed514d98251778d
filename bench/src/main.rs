mod fixture;

use std::hash::Hash;
use std::path::Path;
use std::time::Instant;

use graph_search_core::{
    connected_components, degree_centrality, largest_connected_subgraph, AStar, AdjacencyList,
    Bfs, BfsConfig, Dijkstra, Edge, FullTraversal, Graph, GraphError, GraphObject,
    GraphTraversal, Vertex, VertexId,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Generated graphs: payload is the insertion index, edges carry a relation label.
type BenchGraph = AdjacencyList<u64, &'static str>;

/// Above this many edges the full traversal is skipped; it keeps one path
/// per edge entry in memory.
const FULL_TRAVERSAL_EDGE_LIMIT: usize = 20_000;

struct Workload {
    name: &'static str,
    generate: fn(u64) -> BenchGraph,
    grid: bool,
}

static WORKLOADS: [(&str, Workload); 6] = [
    ("tree", Workload { name: "L-system tree", generate: gen_tree, grid: false }),
    ("scalefree", Workload { name: "Scale-free (edge sampling)", generate: gen_scale_free, grid: false }),
    ("smallworld", Workload { name: "Small-world (Watts-Strogatz)", generate: gen_small_world, grid: false }),
    ("random", Workload { name: "Erdos-Renyi random", generate: gen_random, grid: false }),
    ("barbell", Workload { name: "Barbell (clique-bridge-clique)", generate: gen_barbell, grid: false }),
    ("grid", Workload { name: "Grid lattice (A* with Manhattan)", generate: gen_grid, grid: true }),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");

    if mode == "help" || mode == "--help" {
        println!("Usage: graph-search-bench [mode] [node_count]");
        println!("       graph-search-bench --fixture <path.json>");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  tree        Fractal branching tree (deep paths)");
        println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  barbell     Two dense cliques connected by a thin bridge");
        println!("  grid        Square lattice, A* guided by Manhattan distance");
        println!();
        println!("Default node_count: 100000");
        println!("Log level follows RUST_LOG (default: info)");
        return;
    }

    println!("graph-search-bench");
    println!("==================");
    println!();

    if mode == "--fixture" {
        let Some(path) = args.get(2) else {
            error!("--fixture needs a path to a JSON edge list");
            std::process::exit(2);
        };
        match fixture::load(Path::new(path)) {
            Ok(graph) => run_benchmark(path, &graph, graph_search_core::zero_heuristic),
            Err(err) => {
                error!(%err, "could not load fixture");
                std::process::exit(1);
            }
        }
        return;
    }

    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100_000);

    let selected: Vec<&Workload> = match mode {
        "all" => WORKLOADS.iter().map(|(_, w)| w).collect(),
        _ => WORKLOADS
            .iter()
            .filter(|(key, _)| *key == mode)
            .map(|(_, w)| w)
            .collect(),
    };
    if selected.is_empty() {
        eprintln!("Unknown mode: {}. Use --help for options.", mode);
        return;
    }

    for workload in selected {
        let t = Instant::now();
        let graph = (workload.generate)(node_count);
        let gen_time = t.elapsed();
        println!("--- {} ---", workload.name);
        println!("Target: {} vertices", node_count);
        println!(
            "Generated in {:.2}s, ~{:.0}MB",
            gen_time.as_secs_f64(),
            graph.memory_usage() as f64 / 1_048_576.0
        );

        if workload.grid {
            let width = grid_width(node_count);
            run_benchmark(workload.name, &graph, move |a: &Vertex<u64>, b: &Vertex<u64>| {
                manhattan(width, a, b)
            });
        } else {
            run_benchmark(workload.name, &graph, graph_search_core::zero_heuristic);
        }
    }
}

fn ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

fn run_benchmark<V, E, H>(name: &str, graph: &AdjacencyList<V, E>, heuristic: H)
where
    V: Eq + Hash + Clone,
    E: PartialEq + Clone,
    H: Fn(&Vertex<V>, &Vertex<V>) -> f32,
{
    let (Some(source), Some(far)) = (graph.vertex_ids().next(), graph.vertex_ids().last()) else {
        warn!(workload = name, "empty graph, nothing to benchmark");
        return;
    };
    println!(
        "{} vertices, {} edges ({}), ~{:.0}MB",
        graph.num_verts(),
        graph.num_edges(),
        if graph.is_directed() { "directed" } else { "undirected" },
        graph.memory_usage() as f64 / 1_048_576.0
    );

    // BFS from the first vertex (typically a hub or root)
    println!();
    println!("{:>8} {:>12} {:>10}", "depth", "reached", "time");
    println!("{:->8} {:->12} {:->10}", "", "", "");

    for depth in [1, 2, 3, 5, 10, 20, 50] {
        let t = Instant::now();
        let mut bfs = match Bfs::with_config(graph, source, BfsConfig::new().max_depth(depth)) {
            Ok(bfs) => bfs,
            Err(err) => {
                error!(%err, "bfs setup failed");
                return;
            }
        };
        if let Err(err) = bfs.execute() {
            error!(%err, depth, "bfs failed");
            return;
        }
        let elapsed = ms(t);
        let reached = bfs.traversal().len();
        println!("{:>8} {:>12} {:>8.1}ms", depth, reached, elapsed);
        // Stop if we already found everything
        if reached >= graph.num_verts() {
            println!("{:>8} (entire graph reached)", "");
            break;
        }
    }

    println!();
    let t = Instant::now();
    let mut dijkstra = match Dijkstra::new(graph, source) {
        Ok(d) => d,
        Err(err) => {
            error!(%err, "dijkstra setup failed");
            return;
        }
    };
    if let Err(err) = dijkstra.execute() {
        error!(%err, "dijkstra failed");
        return;
    }
    let dijkstra_ms = ms(t);
    let dijkstra_distance = dijkstra.distance(far).ok().flatten();
    println!(
        "Dijkstra from {}: settled {} in {:.1}ms",
        source,
        dijkstra.traversal().len(),
        dijkstra_ms
    );
    match dijkstra.path(far) {
        Ok(path) if !path.is_empty() => println!(
            "Shortest path {} → {}: {} hops, cost {:.1}",
            source,
            far,
            path.len() - 1,
            dijkstra_distance.unwrap_or(f32::NAN)
        ),
        _ => println!("Shortest path {} → {}: no path", source, far),
    }

    let t = Instant::now();
    match AStar::new(graph, source, far, heuristic) {
        Ok(mut astar) => match astar.execute() {
            Ok(()) => println!(
                "A* {} → {}: cost {:.1}, settled {} in {:.1}ms",
                source,
                far,
                astar.distance().unwrap_or(f32::NAN),
                astar.traversal().len(),
                ms(t)
            ),
            Err(GraphError::UnreachableTarget { .. }) => {
                println!("A* {} → {}: unreachable ({:.1}ms)", source, far, ms(t))
            }
            Err(err) => error!(%err, "a* failed"),
        },
        Err(err) => error!(%err, "a* setup failed"),
    }

    if graph.num_edges() <= FULL_TRAVERSAL_EDGE_LIMIT {
        let t = Instant::now();
        match FullTraversal::new(graph, source) {
            Ok(mut full) => {
                if full.execute().is_ok() {
                    println!(
                        "Full traversal: {} paths over {} vertices in {:.1}ms",
                        full.all_paths().len(),
                        full.traversal().len(),
                        ms(t)
                    );
                }
            }
            Err(err) => error!(%err, "full traversal setup failed"),
        }
    } else {
        println!(
            "Full traversal: skipped ({} edges > {})",
            graph.num_edges(),
            FULL_TRAVERSAL_EDGE_LIMIT
        );
    }

    let t = Instant::now();
    let components = connected_components(graph);
    let components_ms = ms(t);
    let t = Instant::now();
    let largest = largest_connected_subgraph(graph);
    println!(
        "Components: {} in {:.1}ms, largest holds {} vertices ({:.1}ms)",
        components.len(),
        components_ms,
        largest.num_verts(),
        ms(t)
    );

    let t = Instant::now();
    let top = degree_centrality(graph, 3);
    let hubs: Vec<String> = top
        .iter()
        .map(|d| format!("{}:{}", d.id, d.total_degree))
        .collect();
    println!("Top degree: {} ({:.1}ms)", hubs.join(", "), ms(t));

    info!(
        workload = name,
        vertices = graph.num_verts(),
        edges = graph.num_edges(),
        dijkstra_ms,
        components = components.len(),
        "benchmark complete"
    );
    println!();
}

// ---------------------------------------------------------------------------
// Generators: all O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    /// Edge weight in 1..=4.
    fn weight(&mut self) -> f32 {
        1.0 + self.next(4) as f32
    }
    fn rel(&mut self) -> &'static str {
        REL_TYPES[self.next(REL_TYPES.len() as u64) as usize]
    }
}

const REL_TYPES: [&str; 5] = ["IMPLIES", "SUPPORTS", "CONTRADICTS", "RELATED_TO", "REQUIRES"];

/// A graph holding vertices `0..count`.
///
/// Vertices go into a fresh arena in payload order, so payload `i` sits at
/// handle `VertexId(i)`; the generators rely on that to link by index.
fn with_vertices(directed: bool, count: u64) -> BenchGraph {
    let mut graph = BenchGraph::with_capacity(directed, count as usize);
    for i in 0..count {
        graph.insert_vertex(Vertex::new(i));
    }
    graph
}

fn link(graph: &mut BenchGraph, from: u64, to: u64, rel: &'static str, weight: f32) {
    let edge = Edge::new(VertexId(from as usize), VertexId(to as usize))
        .with_payload(rel)
        .with_weight(weight);
    if let Err(err) = graph.add_edge(edge) {
        warn!(%err, from, to, "generator produced a dangling edge");
    }
}

/// L-system fractal tree: deep branching with self-similar structure.
///
/// Each vertex spawns three children. Produces deep paths (log depth) with
/// exponential width. Tests deep BFS and path reconstruction.
fn gen_tree(node_count: u64) -> BenchGraph {
    let mut graph = with_vertices(true, node_count.max(1));
    let mut rng = FastRng::new(42);

    let branching = 3u64;
    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                let (rel, weight) = (rng.rel(), rng.weight());
                link(&mut graph, parent, child, rel, weight);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge and connecting
/// to one of its endpoints. Vertices with more edges are more likely to be
/// picked.
fn gen_scale_free(node_count: u64) -> BenchGraph {
    let edges_per_node = 5u64;
    let seed = 5u64;
    let mut graph = with_vertices(false, node_count.max(seed));
    let mut rng = FastRng::new(12345);

    // Edge list for O(1) preferential attachment sampling
    let mut edge_endpoints: Vec<u64> =
        Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed: small clique
    for i in 0..seed {
        for j in (i + 1)..seed {
            let (rel, weight) = (rng.rel(), rng.weight());
            link(&mut graph, i, j, rel, weight);
            edge_endpoints.push(i);
            edge_endpoints.push(j);
        }
    }

    // Grow: each new vertex attaches to `edges_per_node` existing ones
    for new_node in seed..node_count {
        for _ in 0..edges_per_node.min(new_node) {
            // Proportional to degree
            let idx = rng.next(edge_endpoints.len() as u64) as usize;
            let target = edge_endpoints[idx];
            if target != new_node {
                let (rel, weight) = (rng.rel(), rng.weight());
                link(&mut graph, new_node, target, rel, weight);
                edge_endpoints.push(new_node);
                edge_endpoints.push(target);
            }
        }
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Start with each vertex connected to K nearest neighbors on a ring, then
/// rewire each edge with probability p. High clustering, short paths.
fn gen_small_world(node_count: u64) -> BenchGraph {
    let k = 5u64;
    let p = 0.05f64;
    let node_count = node_count.max(2);
    let mut graph = with_vertices(false, node_count);
    let mut rng = FastRng::new(67890);

    // Forward neighbors only; the graph mirrors each edge
    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let (rel, weight) = (rng.rel(), rng.weight());
            let target = if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                if rewired != i {
                    rewired
                } else {
                    neighbor
                }
            } else {
                neighbor
            };
            if target != i {
                link(&mut graph, i, target, rel, weight);
            }
        }
    }

    graph
}

/// Erdos-Renyi: uniform random directed edges, ~5 per vertex on average.
/// Baseline topology with no structure.
fn gen_random(node_count: u64) -> BenchGraph {
    let node_count = node_count.max(1);
    let target_edges = node_count * 5;
    let mut graph = with_vertices(true, node_count);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            let (rel, weight) = (rng.rel(), rng.weight());
            link(&mut graph, from, to, rel, weight);
        }
    }

    graph
}

/// Barbell: two dense cliques connected by a single thin bridge.
///
/// Worst case for "find path through bottleneck". Each clique has about n/2
/// vertices densely connected; they are joined by a chain of 10 bridge
/// vertices.
fn gen_barbell(node_count: u64) -> BenchGraph {
    let bridge_len = 10u64;
    let clique_size = (node_count.saturating_sub(bridge_len) / 2).max(2);
    let total = clique_size * 2 + bridge_len;
    let mut graph = with_vertices(false, total);
    let mut rng = FastRng::new(99999);

    let mut clique = |graph: &mut BenchGraph, start: u64| {
        for i in 0..clique_size {
            for _ in 0..10u64.min(clique_size - 1) {
                let target = rng.next(clique_size);
                if target != i {
                    let (rel, weight) = (rng.rel(), rng.weight());
                    link(graph, start + i, start + target, rel, weight);
                }
            }
        }
    };

    // Clique A, then the bridge chain, then clique B
    clique(&mut graph, 0);
    let bridge_start = clique_size;
    link(&mut graph, clique_size - 1, bridge_start, "BRIDGES", 1.0);
    for i in 1..bridge_len {
        link(&mut graph, bridge_start + i - 1, bridge_start + i, "NEXT", 1.0);
    }
    let b_start = bridge_start + bridge_len;
    link(&mut graph, b_start - 1, b_start, "BRIDGES", 1.0);
    clique(&mut graph, b_start);

    graph
}

fn grid_width(node_count: u64) -> u64 {
    ((node_count as f64).sqrt().ceil() as u64).max(1)
}

/// Square lattice: vertex `y * width + x` links to its right and lower
/// neighbors. Weights are at least 1, so Manhattan distance never
/// overestimates and A* stays optimal.
fn gen_grid(node_count: u64) -> BenchGraph {
    let width = grid_width(node_count);
    let mut graph = with_vertices(false, width * width);
    let mut rng = FastRng::new(31337);

    for y in 0..width {
        for x in 0..width {
            let here = y * width + x;
            if x + 1 < width {
                let weight = rng.weight();
                link(&mut graph, here, here + 1, "EAST", weight);
            }
            if y + 1 < width {
                let weight = rng.weight();
                link(&mut graph, here, here + width, "SOUTH", weight);
            }
        }
    }

    graph
}

fn manhattan(width: u64, a: &Vertex<u64>, b: &Vertex<u64>) -> f32 {
    match (a.payload(), b.payload()) {
        (Some(&a), Some(&b)) => {
            let (ax, ay) = (a % width, a / width);
            let (bx, by) = (b % width, b / width);
            (ax.abs_diff(bx) + ay.abs_diff(by)) as f32
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_link_by_index() {
        let tree = gen_tree(40);
        assert_eq!(tree.num_verts(), 40);
        assert_eq!(tree.num_edges(), 39);
        assert_eq!(tree.vertex(VertexId(7)).and_then(|v| v.payload()), Some(&7));

        let barbell = gen_barbell(50);
        assert_eq!(barbell.num_verts(), 50);
        let bridge = barbell.find_edge(VertexId(20), VertexId(21)).unwrap();
        assert_eq!(bridge.payload(), Some(&"NEXT"));
    }

    #[test]
    fn test_grid_heuristic_guides_astar() {
        let graph = gen_grid(100);
        let width = grid_width(100);
        let (source, far) = (VertexId(0), VertexId(99));
        let mut dijkstra = Dijkstra::new(&graph, source).unwrap();
        dijkstra.execute().unwrap();

        let mut astar = AStar::new(&graph, source, far, |a: &Vertex<u64>, b: &Vertex<u64>| {
            manhattan(width, a, b)
        })
        .unwrap();
        astar.execute().unwrap();
        assert_eq!(astar.distance(), dijkstra.distance(far).unwrap());
        assert!(astar.traversal().len() <= dijkstra.traversal().len());
    }

    #[test]
    fn test_manhattan() {
        let a = Vertex::new(0u64);
        let b = Vertex::new(23u64);
        assert_eq!(manhattan(10, &a, &b), 5.0);
        assert_eq!(manhattan(10, &a, &Vertex::anonymous()), 0.0);
    }
}
