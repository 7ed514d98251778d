//! JSON edge-list fixtures, so the benchmark can run on a real graph.
//!
//! ```json
//! {
//!   "directed": true,
//!   "vertices": ["a", "b", "c"],
//!   "edges": [{ "from": "a", "to": "b", "weight": 2.5 }, { "from": "b", "to": "c" }]
//! }
//! ```
//!
//! Endpoints missing from `vertices` are added on first use; `weight`
//! defaults to 1.

use std::fs;
use std::path::Path;

use graph_search_core::{AdjacencyList, Edge, Graph, Vertex};
use serde::Deserialize;
use tracing::{debug, warn};

pub type FixtureGraph = AdjacencyList<String>;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    vertices: Vec<String>,
    #[serde(default)]
    edges: Vec<FixtureEdge>,
}

#[derive(Debug, Deserialize)]
struct FixtureEdge {
    from: String,
    to: String,
    #[serde(default = "default_weight")]
    weight: f32,
}

fn default_directed() -> bool {
    true
}

fn default_weight() -> f32 {
    Edge::<()>::DEFAULT_WEIGHT
}

/// Read and build the graph described by the JSON file at `path`.
pub fn load(path: &Path) -> Result<FixtureGraph, FixtureError> {
    let text = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

pub fn parse(json: &str) -> Result<FixtureGraph, FixtureError> {
    let file: FixtureFile = serde_json::from_str(json)?;
    let mut graph = FixtureGraph::with_capacity(file.directed, file.vertices.len());

    for name in file.vertices {
        graph.add_vertex(Vertex::new(name));
    }

    let mut skipped = 0usize;
    for edge in file.edges {
        let from = graph.insert_vertex(Vertex::new(edge.from));
        let to = graph.insert_vertex(Vertex::new(edge.to));
        if edge.weight < 0.0 || edge.weight.is_nan() {
            skipped += 1;
            continue;
        }
        match graph.add_edge(Edge::new(from, to).with_weight(edge.weight)) {
            Ok(true) => {}
            Ok(false) | Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "fixture: skipped duplicate or negative-weight edges");
    }
    debug!(
        vertices = graph.num_verts(),
        edges = graph.num_edges(),
        directed = graph.is_directed(),
        "fixture loaded"
    );
    Ok(graph)
}
