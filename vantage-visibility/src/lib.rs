//! Visibility-graph construction.
//!
//! A visibility graph connects pairs of spatial nodes that can see each
//! other: an occlusion ray is fired between the eye points above each pair,
//! and an unobstructed pair becomes a directed edge scored by its distance.
//!
//! Three builders cover the common shapes:
//!
//! - [`all_to_all`] - every ordered pair of one node set
//! - [`group_to_group`] - every pair of a from-set and a to-set
//! - [`all_to_all_undirected`] - symmetric variant that tests each
//!   unordered pair once and inserts both directions, halving the ray
//!   budget
//!
//! All builders insert every input node into the result graph in input
//! order before adding edges, so node ids follow the input order and
//! isolated nodes survive.
//!
//! # Example
//!
//! ```
//! use vantage_mesh::MeshInfo;
//! use vantage_raycast::RayEngine;
//! use vantage_visibility::{all_to_all, DEFAULT_HEIGHT};
//! use nalgebra::Point3;
//!
//! let soup = [
//!     -10.0, -10.0, 0.0, 10.0, -10.0, 0.0, -10.0, 10.0, 0.0,
//!     10.0, 10.0, 0.0, -10.0, 10.0, 0.0, 10.0, -10.0, 0.0,
//! ];
//! let plane = MeshInfo::from_triangle_soup(0, &soup).unwrap();
//! let engine = RayEngine::new(&plane, false).unwrap();
//!
//! let nodes = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)];
//! let graph = all_to_all(&engine, &nodes, DEFAULT_HEIGHT);
//!
//! // Both nodes stand on the plane and see each other
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod directed;
mod undirected;

pub use directed::{all_to_all, group_to_group};
pub use undirected::all_to_all_undirected;

use nalgebra::{Point3, Vector3};
use vantage_raycast::RayEngine;

/// Default observer height added to each node's Z coordinate.
pub const DEFAULT_HEIGHT: f32 = 1.7;

/// Shortening applied to each occlusion ray so it stops just before the
/// target eye point instead of hitting geometry the target stands on.
/// Pairs closer than this are visible by definition.
const OCCLUSION_EPSILON: f32 = 1e-4;

/// Raise a node to its eye point.
fn eye(node: &Point3<f32>, height: f32) -> Point3<f32> {
    Point3::new(node.x, node.y, node.z + height)
}

/// Test the sight line between two eye points.
///
/// Returns the distance between them when unobstructed, `None` when some
/// triangle blocks the segment.
fn sight_line(engine: &RayEngine, from: &Point3<f32>, to: &Point3<f32>) -> Option<f32> {
    let direction: Vector3<f32> = to - from;
    let distance = direction.norm();
    if distance <= OCCLUSION_EPSILON {
        // Coincident endpoints cannot occlude themselves
        return Some(distance);
    }

    let unit = direction / distance;
    if engine.fire_occlusion(*from, unit, distance - OCCLUSION_EPSILON) {
        None
    } else {
        Some(distance)
    }
}
