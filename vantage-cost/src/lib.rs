//! Derived edge-cost overlays for spatial graphs.
//!
//! Both algorithms read the geometry of each edge's endpoints, compute a new
//! score per edge, and install the scores as a named cost layer over the
//! graph's default topology:
//!
//! - [`calculate_and_store_cross_slope`] writes the [`CROSS_SLOPE`] layer:
//!   the lateral height difference across the direction of travel, a
//!   mobility-cost proxy.
//! - [`calculate_and_store_energy_expenditure`] writes the
//!   [`ENERGY_EXPENDITURE`] layer: metabolic cost of traversing the edge on
//!   foot, from a published gradient-walking model.
//!
//! Neither algorithm changes the default layer or the graph's topology.
//!
//! # Example
//!
//! ```
//! use vantage_cost::{calculate_and_store_energy_expenditure, ENERGY_EXPENDITURE};
//! use vantage_graph::Graph;
//! use nalgebra::Point3;
//!
//! let mut graph = Graph::new();
//! graph.add_edge(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), 1.0);
//!
//! calculate_and_store_energy_expenditure(&mut graph).unwrap();
//!
//! // Flat ground costs the baseline rate times the metre walked
//! let cost = graph.get_cost(0, 1, Some(ENERGY_EXPENDITURE)).unwrap();
//! assert!((cost - 2.5).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod cross_slope;
mod energy;

pub use cross_slope::calculate_and_store_cross_slope;
pub use energy::calculate_and_store_energy_expenditure;

/// Name of the cost layer written by [`calculate_and_store_cross_slope`].
pub const CROSS_SLOPE: &str = "cross_slope";

/// Name of the cost layer written by
/// [`calculate_and_store_energy_expenditure`].
pub const ENERGY_EXPENDITURE: &str = "energy_expenditure";
