//! Spatial sight and traversal analysis over triangle meshes.
//!
//! This umbrella crate re-exports the workspace members under short module
//! names, providing a unified API for building visibility and mobility
//! graphs from triangle geometry.
//!
//! # Quick Start
//!
//! ```
//! use vantage::prelude::*;
//!
//! // A ground plane
//! let soup = [
//!     -10.0, -10.0, 0.0, 10.0, -10.0, 0.0, -10.0, 10.0, 0.0,
//!     10.0, 10.0, 0.0, -10.0, 10.0, 0.0, 10.0, -10.0, 0.0,
//! ];
//! let plane = MeshInfo::from_triangle_soup(0, &soup).unwrap();
//! let engine = RayEngine::new(&plane, false).unwrap();
//!
//! // Which sampled points can see each other?
//! let nodes = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(3.0, 1.0, 0.0),
//!     Point3::new(-2.0, 4.0, 0.0),
//! ];
//! let mut graph = all_to_all_undirected(&engine, &nodes, DEFAULT_HEIGHT, None);
//!
//! // Summarize each node's total visible distance
//! let scores = graph.aggregate_costs(Aggregation::Sum, true, None).unwrap();
//! assert_eq!(scores.len(), nodes.len());
//! ```
//!
//! # Module Organization
//!
//! - [`mesh`] - Owned triangle meshes and bounds ([`MeshInfo`](mesh::MeshInfo))
//! - [`raycast`] - BVH ray engine ([`RayEngine`](raycast::RayEngine))
//! - [`graph`] - Spatial graphs with CSR compression, cost layers,
//!   attributes and aggregation ([`Graph`](graph::Graph))
//! - [`cost`] - Cross-slope and energy-expenditure overlays
//! - [`visibility`] - Visibility-graph builders

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Owned triangle meshes and bounds.
pub use vantage_mesh as mesh;

/// BVH-accelerated ray intersection.
pub use vantage_raycast as raycast;

/// Spatial graphs: quantized keys, CSR compression, cost layers,
/// attributes, aggregation.
pub use vantage_graph as graph;

/// Derived edge-cost overlays.
pub use vantage_cost as cost;

/// Visibility-graph construction.
pub use vantage_visibility as visibility;

/// Common imports for spatial analysis.
///
/// # Usage
///
/// ```
/// use vantage::prelude::*;
/// ```
pub mod prelude {
    pub use vantage_cost::{
        calculate_and_store_cross_slope, calculate_and_store_energy_expenditure, CROSS_SLOPE,
        ENERGY_EXPENDITURE,
    };
    pub use vantage_graph::{Aggregation, Csr, Edge, Graph, GraphError, Node, Subgraph};
    pub use vantage_mesh::{Aabb, MeshError, MeshInfo, Point3, Vector3};
    pub use vantage_raycast::{HitRecord, RayEngine, RaycastError};
    pub use vantage_visibility::{
        all_to_all, all_to_all_undirected, group_to_group, DEFAULT_HEIGHT,
    };
}
