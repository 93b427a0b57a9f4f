//! Cross-slope scores: lateral height change across the direction of travel.

use nalgebra::Point3;
use tracing::debug;
use vantage_graph::{Graph, GraphError};

use crate::CROSS_SLOPE;

/// Horizontal directions shorter than this have no usable bearing.
const FLAT_EPSILON: f32 = 1e-6;

/// Compute the cross-slope of every edge and store it as the
/// [`CROSS_SLOPE`] cost layer.
///
/// For each directed edge `(p -> c)`, the parent's other outgoing edges are
/// ranked by how close to perpendicular their horizontal bearings are to
/// the bearing of `p -> c`; ties resolve to the smaller child id. The score
/// is the absolute Z difference between the two most perpendicular
/// neighbors, or between the parent and the single neighbor when only one
/// exists, or `0` when none do.
///
/// Compresses the graph first when needed.
///
/// # Errors
///
/// Propagates [`GraphError`] from the overlay install; with a well-formed
/// graph this cannot fail, since every written edge exists in the default
/// layer by construction.
pub fn calculate_and_store_cross_slope(graph: &mut Graph) -> Result<(), GraphError> {
    graph.compress();

    let mut batch: Vec<(u32, u32, f32)> = Vec::with_capacity(graph.edge_count());
    for subgraph in graph.subgraphs() {
        let parent = subgraph.node;
        for edge in subgraph.edges {
            let score = cross_slope_score(graph, &parent.position, edge.child, subgraph.edges);
            batch.push((parent.id, edge.child, score));
        }
    }

    debug!(edges = batch.len(), "computed cross-slope scores");
    graph.add_edges_to_layer(CROSS_SLOPE, &batch)
}

/// Score one edge against its parent's other outgoing edges.
fn cross_slope_score(
    graph: &Graph,
    parent: &Point3<f32>,
    child: u32,
    siblings: &[vantage_graph::Edge],
) -> f32 {
    let child_pos = graph.nodes()[child as usize].position;
    let Some(bearing) = horizontal_bearing(parent, &child_pos) else {
        // A vertical edge has no direction of travel to be perpendicular to
        return 0.0;
    };

    // Rank siblings by perpendicularity, then by child id
    let mut ranked: Vec<(f32, u32)> = siblings
        .iter()
        .filter(|e| e.child != child)
        .filter_map(|e| {
            let pos = graph.nodes()[e.child as usize].position;
            let sibling_bearing = horizontal_bearing(parent, &pos)?;
            let dot = (bearing[0] * sibling_bearing[0] + bearing[1] * sibling_bearing[1]).abs();
            Some((dot, e.child))
        })
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    match ranked.as_slice() {
        [] => 0.0,
        [(_, a)] => {
            let a_z = graph.nodes()[*a as usize].position.z;
            (a_z - parent.z).abs()
        }
        [(_, a), (_, b), ..] => {
            let a_z = graph.nodes()[*a as usize].position.z;
            let b_z = graph.nodes()[*b as usize].position.z;
            (a_z - b_z).abs()
        }
    }
}

/// Unit direction from `from` to `to` in the horizontal plane, or `None`
/// when the two points share an XY position.
fn horizontal_bearing(from: &Point3<f32>, to: &Point3<f32>) -> Option<[f32; 2]> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len < FLAT_EPSILON {
        return None;
    }
    Some([dx / len, dy / len])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    /// The seven-node fixture exercised by the original cost algorithms.
    fn seven_node_graph() -> Graph {
        let n0 = p(2.0, 6.0, 6.0);
        let n1 = p(0.0, 0.0, 0.0);
        let n2 = p(-5.0, 5.0, 4.0);
        let n3 = p(-1.0, 1.0, 1.0);
        let n4 = p(2.0, 2.0, 2.0);
        let n5 = p(5.0, 3.0, 2.0);
        let n6 = p(-2.0, -5.0, 1.0);

        let mut graph = Graph::new();
        graph.add_edge(n0, n1, 0.0);
        graph.add_edge(n1, n2, 0.0);
        graph.add_edge(n1, n3, 0.0);
        graph.add_edge(n1, n4, 0.0);
        graph.add_edge(n2, n4, 0.0);
        graph.add_edge(n3, n5, 0.0);
        graph.add_edge(n5, n6, 0.0);
        graph.add_edge(n4, n6, 0.0);
        graph.compress();
        graph
    }

    #[test]
    fn test_layer_covers_every_edge() {
        let mut graph = seven_node_graph();
        calculate_and_store_cross_slope(&mut graph).unwrap();

        let nnz = graph.csr(None).unwrap().nnz();
        let overlay = graph.csr(Some(CROSS_SLOPE)).unwrap();
        assert_eq!(overlay.nnz(), nnz);
        assert!(overlay.data().iter().all(|&score| score >= 0.0));
    }

    #[test]
    fn test_single_outgoing_edge_scores_zero() {
        let mut graph = seven_node_graph();
        calculate_and_store_cross_slope(&mut graph).unwrap();

        // n0 -> n1 has no sibling edges
        let n0 = graph.get_id(&p(2.0, 6.0, 6.0)).unwrap();
        let n1 = graph.get_id(&p(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(graph.get_cost(n0, n1, Some(CROSS_SLOPE)).unwrap(), 0.0);
    }

    #[test]
    fn test_two_perpendicular_neighbors() {
        let mut graph = seven_node_graph();
        calculate_and_store_cross_slope(&mut graph).unwrap();

        let n1 = graph.get_id(&p(0.0, 0.0, 0.0)).unwrap();
        let n2 = graph.get_id(&p(-5.0, 5.0, 4.0)).unwrap();
        let n3 = graph.get_id(&p(-1.0, 1.0, 1.0)).unwrap();
        let n4 = graph.get_id(&p(2.0, 2.0, 2.0)).unwrap();

        // For n1 -> n2, the exactly perpendicular n4 ranks first and n3
        // second: |z4 - z3| = 1
        assert_relative_eq!(
            graph.get_cost(n1, n2, Some(CROSS_SLOPE)).unwrap(),
            1.0,
            epsilon = 1e-5
        );

        // For n1 -> n3: n4 is perpendicular, n2 is parallel: |z4 - z2| = 2
        assert_relative_eq!(
            graph.get_cost(n1, n3, Some(CROSS_SLOPE)).unwrap(),
            2.0,
            epsilon = 1e-5
        );

        // For n1 -> n4 both siblings are perpendicular; the tie resolves to
        // ascending child id, so the score is |z2 - z3| = 3
        assert_relative_eq!(
            graph.get_cost(n1, n4, Some(CROSS_SLOPE)).unwrap(),
            3.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_single_perpendicular_uses_parent_z() {
        // Parent with two edges: travel along +X, one sibling along +Y
        let mut graph = Graph::new();
        graph.add_edge(p(0.0, 0.0, 1.0), p(5.0, 0.0, 1.0), 0.0);
        graph.add_edge(p(0.0, 0.0, 1.0), p(0.0, 5.0, 4.0), 0.0);
        graph.compress();

        calculate_and_store_cross_slope(&mut graph).unwrap();

        // |z_sibling - z_parent| = |4 - 1| = 3
        assert_relative_eq!(
            graph.get_cost(0, 1, Some(CROSS_SLOPE)).unwrap(),
            3.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_vertical_edge_scores_zero() {
        let mut graph = Graph::new();
        graph.add_edge(p(0.0, 0.0, 0.0), p(0.0, 0.0, 5.0), 0.0);
        graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), 0.0);
        graph.compress();

        calculate_and_store_cross_slope(&mut graph).unwrap();
        assert_eq!(graph.get_cost(0, 1, Some(CROSS_SLOPE)).unwrap(), 0.0);
    }
}
