//! Energy expenditure of traversing an edge on foot.

use tracing::debug;
use vantage_graph::{Graph, GraphError};

use crate::ENERGY_EXPENDITURE;

/// Grades outside this range fall outside the measured range of the
/// metabolic model and are clamped to it.
const MAX_GRADE: f64 = 0.4;

/// Compute the energy cost of every edge and store it as the
/// [`ENERGY_EXPENDITURE`] cost layer.
///
/// The per-metre metabolic rate comes from the gradient-walking model of
/// Minetti et al. (2002):
///
/// `Cw(g) = 280.5 g^5 - 58.7 g^4 - 76.8 g^3 + 51.9 g^2 + 19.6 g + 2.5`
///
/// in J/(kg*m), where `g` is the grade (rise over horizontal run) clamped
/// to the model's measured range of +/-0.4. An edge's score is `Cw(g)`
/// times its 3-D length; on flat ground this reduces to the 2.5 J/(kg*m)
/// baseline times the distance walked. Vertical edges take the clamp
/// boundary with the sign of the height change.
///
/// Compresses the graph first when needed.
///
/// # Errors
///
/// Propagates [`GraphError`] from the overlay install; with a well-formed
/// graph this cannot fail, since every written edge exists in the default
/// layer by construction.
pub fn calculate_and_store_energy_expenditure(graph: &mut Graph) -> Result<(), GraphError> {
    graph.compress();

    let mut batch: Vec<(u32, u32, f32)> = Vec::with_capacity(graph.edge_count());
    for subgraph in graph.subgraphs() {
        let parent = subgraph.node.position;
        for edge in subgraph.edges {
            let child = graph.nodes()[edge.child as usize].position;

            let dx = f64::from(child.x - parent.x);
            let dy = f64::from(child.y - parent.y);
            let dz = f64::from(child.z - parent.z);
            let run = dx.hypot(dy);
            let length = (dx * dx + dy * dy + dz * dz).sqrt();

            let grade = if run > f64::EPSILON {
                (dz / run).clamp(-MAX_GRADE, MAX_GRADE)
            } else if dz == 0.0 {
                0.0
            } else {
                MAX_GRADE.copysign(dz)
            };

            #[allow(clippy::cast_possible_truncation)]
            let score = (metabolic_rate(grade) * length) as f32;
            batch.push((subgraph.node.id, edge.child, score));
        }
    }

    debug!(edges = batch.len(), "computed energy expenditure scores");
    graph.add_edges_to_layer(ENERGY_EXPENDITURE, &batch)
}

/// Metabolic rate in J/(kg*m) for walking at grade `g`.
fn metabolic_rate(g: f64) -> f64 {
    ((((280.5 * g - 58.7) * g - 76.8) * g + 51.9) * g + 19.6) * g + 2.5
}
