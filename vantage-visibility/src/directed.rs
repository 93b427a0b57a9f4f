//! Directed visibility-graph builders.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::info;
use vantage_graph::Graph;
use vantage_raycast::RayEngine;

use crate::{eye, sight_line};

/// Build a visibility graph over every ordered pair of `nodes`.
///
/// Each node is raised by `height` to its eye point and an occlusion ray is
/// fired for every ordered pair `(i, j)` with `i != j`. An unobstructed
/// pair becomes the directed edge `(i, j)` scored by the pair's distance.
///
/// Rows fan out across the rayon pool; per-row edge buffers are merged in
/// row order, so the result is identical to a sequential run.
#[must_use]
pub fn all_to_all(engine: &RayEngine, nodes: &[Point3<f32>], height: f32) -> Graph {
    let eyes: Vec<Point3<f32>> = nodes.iter().map(|n| eye(n, height)).collect();

    let rows: Vec<Vec<(usize, usize, f32)>> = (0..nodes.len())
        .into_par_iter()
        .map(|i| {
            let mut row = Vec::new();
            for j in 0..nodes.len() {
                if i == j {
                    continue;
                }
                if let Some(distance) = sight_line(engine, &eyes[i], &eyes[j]) {
                    row.push((i, j, distance));
                }
            }
            row
        })
        .collect();

    let graph = assemble(nodes, rows.iter().flatten());
    info!(
        nodes = nodes.len(),
        edges = graph.edge_count(),
        "built all-to-all visibility graph"
    );
    graph
}

/// Build a visibility graph over the Cartesian product `from x to`.
///
/// Node ids in the returned graph run `[0, |from| + |to|)` with the
/// from-nodes first. Edges run from the from-set to the to-set only.
#[must_use]
pub fn group_to_group(
    engine: &RayEngine,
    from: &[Point3<f32>],
    to: &[Point3<f32>],
    height: f32,
) -> Graph {
    let from_eyes: Vec<Point3<f32>> = from.iter().map(|n| eye(n, height)).collect();
    let to_eyes: Vec<Point3<f32>> = to.iter().map(|n| eye(n, height)).collect();

    let rows: Vec<Vec<(usize, usize, f32)>> = (0..from.len())
        .into_par_iter()
        .map(|i| {
            let mut row = Vec::new();
            for j in 0..to.len() {
                if let Some(distance) = sight_line(engine, &from_eyes[i], &to_eyes[j]) {
                    row.push((i, from.len() + j, distance));
                }
            }
            row
        })
        .collect();

    let all_nodes: Vec<Point3<f32>> = from.iter().chain(to.iter()).copied().collect();
    let graph = assemble(&all_nodes, rows.iter().flatten());
    info!(
        from = from.len(),
        to = to.len(),
        edges = graph.edge_count(),
        "built group-to-group visibility graph"
    );
    graph
}

/// Insert all nodes in input order, then the edge list.
pub(crate) fn assemble<'a>(
    nodes: &[Point3<f32>],
    edges: impl Iterator<Item = &'a (usize, usize, f32)>,
) -> Graph {
    let mut graph = Graph::new();
    for node in nodes {
        graph.insert_node(*node);
    }
    for &(i, j, distance) in edges {
        graph.add_edge(nodes[i], nodes[j], distance);
    }
    graph
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::plane_engine;
    use crate::DEFAULT_HEIGHT;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_node_set() {
        let engine = plane_engine();
        let graph = all_to_all(&engine, &[], DEFAULT_HEIGHT);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_single_node() {
        let engine = plane_engine();
        let graph = all_to_all(&engine, &[Point3::new(0.0, 0.0, 0.0)], DEFAULT_HEIGHT);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_three_nodes_on_plane() {
        // One node below the plane has every sight line blocked
        let engine = plane_engine();
        let nodes = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -10.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let graph = all_to_all(&engine, &nodes, DEFAULT_HEIGHT);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let expected = (nodes[2] - nodes[0]).norm();
        assert_relative_eq!(graph.get_cost(0, 2, None).unwrap(), expected, epsilon = 1e-4);
        assert_relative_eq!(graph.get_cost(2, 0, None).unwrap(), expected, epsilon = 1e-4);
        assert!(graph.get_cost(0, 1, None).is_err());
        assert!(graph.get_cost(1, 0, None).is_err());
        assert!(graph.get_cost(1, 2, None).is_err());
        assert!(graph.get_cost(2, 1, None).is_err());
    }

    #[test]
    fn test_ids_follow_input_order() {
        let engine = plane_engine();
        let nodes = [
            Point3::new(3.0, 3.0, 0.0),
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(0.0, -4.0, 0.0),
        ];
        let graph = all_to_all(&engine, &nodes, DEFAULT_HEIGHT);

        for (i, node) in nodes.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let expected = i as u32;
            assert_eq!(graph.get_id(node), Some(expected));
        }
    }

    #[test]
    fn test_group_to_group_layout() {
        let engine = plane_engine();
        let from = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let to = [Point3::new(0.0, 3.0, 0.0)];

        let graph = group_to_group(&engine, &from, &to, DEFAULT_HEIGHT);

        // From-nodes first, then to-nodes
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.get_id(&from[0]), Some(0));
        assert_eq!(graph.get_id(&from[1]), Some(1));
        assert_eq!(graph.get_id(&to[0]), Some(2));

        // Edges only run from the from-set into the to-set
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.get_cost(0, 2, None).is_ok());
        assert!(graph.get_cost(1, 2, None).is_ok());
        assert!(graph.get_cost(2, 0, None).is_err());
        assert!(graph.get_cost(0, 1, None).is_err());
    }

    #[test]
    fn test_coincident_nodes_stay_visible() {
        // Two nodes at the same position: the epsilon clamp marks the pair
        // visible with a zero-length sight line
        let engine = plane_engine();
        let nodes = [Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0)];
        let graph = all_to_all(&engine, &nodes, DEFAULT_HEIGHT);

        // Quantized identity collapses the two inputs onto one node; the
        // self-pair is visible but self-edges collapse with it
        assert_eq!(graph.node_count(), 1);
    }
}
