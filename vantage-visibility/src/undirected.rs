//! Symmetric visibility-graph builder.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{info, warn};
use vantage_graph::Graph;
use vantage_raycast::RayEngine;

use crate::{eye, sight_line};

/// Build an undirected visibility graph, testing each unordered pair once.
///
/// Visibility between fixed eye points is symmetric, so only pairs with
/// `i < j` are tested; a visible pair inserts both `(i, j)` and `(j, i)`
/// with the same score. This halves the ray budget of
/// [`all_to_all`](crate::all_to_all).
///
/// `cores` pins the degree of parallelism to a dedicated thread pool;
/// `None` uses every available hardware thread. Row chunks are merged in
/// row order and edges inserted serially from the lower-indexed endpoint,
/// so the result does not depend on thread scheduling.
#[must_use]
pub fn all_to_all_undirected(
    engine: &RayEngine,
    nodes: &[Point3<f32>],
    height: f32,
    cores: Option<usize>,
) -> Graph {
    if let Some(threads) = cores.filter(|&threads| threads > 0) {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => return pool.install(|| build(engine, nodes, height)),
            Err(error) => {
                warn!(%error, threads, "could not build pinned thread pool; using the global pool");
            }
        }
    }
    build(engine, nodes, height)
}

fn build(engine: &RayEngine, nodes: &[Point3<f32>], height: f32) -> Graph {
    let eyes: Vec<Point3<f32>> = nodes.iter().map(|n| eye(n, height)).collect();

    // One chunk per row i covering the pairs (i, i+1..n)
    let rows: Vec<Vec<(usize, usize, f32)>> = (0..nodes.len())
        .into_par_iter()
        .map(|i| {
            let mut row = Vec::new();
            for j in (i + 1)..nodes.len() {
                if let Some(distance) = sight_line(engine, &eyes[i], &eyes[j]) {
                    row.push((i, j, distance));
                }
            }
            row
        })
        .collect();

    let mut graph = Graph::new();
    for node in nodes {
        graph.insert_node(*node);
    }
    for &(i, j, distance) in rows.iter().flatten() {
        graph.add_edge(nodes[i], nodes[j], distance);
        graph.add_edge(nodes[j], nodes[i], distance);
    }

    info!(
        nodes = nodes.len(),
        edges = graph.edge_count(),
        "built undirected visibility graph"
    );
    graph
}
