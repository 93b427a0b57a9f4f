//! Error types for mesh construction.

/// Errors that can occur while constructing a mesh.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MeshError {
    /// A flat buffer's length is not a multiple of its element stride.
    #[error("{buffer} buffer length {len} is not a multiple of {stride}")]
    BufferLength {
        /// Which buffer was malformed.
        buffer: &'static str,
        /// The offending length.
        len: usize,
        /// The required stride.
        stride: usize,
    },

    /// An index refers past the end of the vertex buffer.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index value.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The mesh contains no triangles.
    #[error("mesh contains no triangles")]
    Empty,
}
