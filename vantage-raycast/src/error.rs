//! Error types for engine construction and batch queries.

use vantage_mesh::MeshError;

/// Errors that can occur while building or feeding the ray engine.
///
/// Ray queries themselves never error: a miss is `None` or `false`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RaycastError {
    /// The scene would contain no triangles.
    #[error("scene contains no triangles")]
    EmptyScene,

    /// A mesh id is already present in the scene.
    #[error("mesh id {id} is already present in the scene")]
    MeshIdCollision {
        /// The colliding id.
        id: i32,
    },

    /// Parallel origin/direction arrays differ in length.
    #[error("parallel ray arrays differ in length: {origins} origins vs {directions} directions")]
    LengthMismatch {
        /// Number of origins supplied.
        origins: usize,
        /// Number of directions supplied.
        directions: usize,
    },

    /// A mesh handed to the engine failed validation.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
