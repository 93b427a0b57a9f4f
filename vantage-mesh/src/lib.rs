//! Owned triangle meshes for spatial analysis.
//!
//! This crate provides the foundational geometry types consumed by the rest
//! of the workspace:
//!
//! - [`MeshInfo`] - An owned triangle mesh with flat vertex/index buffers
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Coordinate System
//!
//! Coordinates are `f32` and the library is unit-agnostic. Analysis code
//! treats Z as up; meshes authored Y-up can be converted at load time with
//! [`MeshInfo::rotate`] and the [`MeshInfo::Y_UP_TO_Z_UP`] preset.
//!
//! # Example
//!
//! ```
//! use vantage_mesh::MeshInfo;
//!
//! // A single triangle in the XY plane
//! let vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let indices = vec![0, 1, 2];
//!
//! let mesh = MeshInfo::new(0, vertices, indices).unwrap();
//! assert_eq!(mesh.vertex_count(), 3);
//! assert_eq!(mesh.triangle_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod error;
mod mesh;

pub use bounds::Aabb;
pub use error::MeshError;
pub use mesh::MeshInfo;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
