//! Weighted directed graphs over points in space.
//!
//! A [`Graph`] keys its nodes by 3-D coordinate with quantized equality:
//! coordinates are rounded to a fixed number of fractional digits before
//! hashing, so positions that drift by less than the rounding unit resolve
//! to the same node. Edges carry an `f32` score and an integer step-type
//! classifier.
//!
//! # Storage states
//!
//! The graph is hybrid. Mutation goes to per-node adjacency lists; analysis
//! reads the compressed-sparse-row form built on demand by
//! [`Graph::compress`] and invalidated by any mutation. Named cost layers
//! overlay alternate scores on the same topology, and per-node string
//! attributes ride alongside.
//!
//! # Example
//!
//! ```
//! use vantage_graph::Graph;
//! use nalgebra::Point3;
//!
//! let mut graph = Graph::new();
//! let a = Point3::new(0.0, 0.0, 0.0);
//! let b = Point3::new(1.0, 0.0, 0.0);
//!
//! graph.add_edge(a, b, 1.5);
//! graph.compress();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.get_id(&b), Some(1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod aggregate;
mod csr;
mod error;
mod graph;
mod node;

pub use aggregate::Aggregation;
pub use csr::Csr;
pub use error::GraphError;
pub use graph::{Graph, Subgraph};
pub use node::{Edge, Node};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
