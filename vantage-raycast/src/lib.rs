//! BVH-accelerated ray intersection over triangle meshes.
//!
//! This crate builds a shared, immutable acceleration structure from one or
//! more [`MeshInfo`](vantage_mesh::MeshInfo) instances and answers ray
//! queries against it:
//!
//! - [`RayEngine::intersect`] - closest hit with distance, mesh id and point
//! - [`RayEngine::fire_occlusion`] - bounded any-hit, the cheap visibility test
//! - [`RayEngine::fire_many`] - order-preserving parallel fan-out
//!
//! # Precision modes
//!
//! The standard mode tests candidate triangles with a single-precision
//! Möller-Trumbore routine. Constructing the engine with `precise = true`
//! re-tests candidates with a double-precision watertight routine that
//! shears the triangle into the ray's dominant-axis frame, eliminating
//! false misses along silhouette edges of nearly axis-aligned meshes.
//!
//! # Sharing
//!
//! `RayEngine` is cheap to clone: clones share the underlying scene and the
//! scene is freed when the last clone drops. Queries take `&self` and are
//! safe to issue from many threads at once.
//!
//! # Example
//!
//! ```
//! use vantage_mesh::MeshInfo;
//! use vantage_raycast::RayEngine;
//! use nalgebra::{Point3, Vector3};
//!
//! let soup = [
//!     -10.0, -10.0, 0.0, 10.0, -10.0, 0.0, -10.0, 10.0, 0.0,
//!     10.0, 10.0, 0.0, -10.0, 10.0, 0.0, 10.0, -10.0, 0.0,
//! ];
//! let plane = MeshInfo::from_triangle_soup(0, &soup).unwrap();
//! let engine = RayEngine::new(&plane, false).unwrap();
//!
//! let hit = engine
//!     .intersect(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -1.0), None)
//!     .unwrap();
//! assert!((hit.distance - 1.0).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bvh;
mod engine;
mod error;
mod intersect;

pub use engine::{HitRecord, RayEngine};
pub use error::RaycastError;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
