//! Error types for graph operations.

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// A node id is not present in the graph.
    #[error("node id {id} is not in the graph")]
    NoSuchNode {
        /// The offending id.
        id: u32,
    },

    /// No edge exists between the given nodes.
    #[error("no edge from node {parent} to node {child}")]
    NoSuchEdge {
        /// Parent node id.
        parent: u32,
        /// Child node id.
        child: u32,
    },

    /// An overlay write referenced an edge absent from the default layer.
    #[error("edge {parent} -> {child} is not in the default cost layer")]
    EdgeNotInDefaultLayer {
        /// Parent node id.
        parent: u32,
        /// Child node id.
        child: u32,
    },

    /// A named cost layer does not exist.
    #[error("cost layer {name:?} is not defined")]
    CostLayerNotFound {
        /// The requested layer name.
        name: String,
    },

    /// A named node attribute does not exist.
    #[error("node attribute {name:?} is not defined")]
    AttributeNotFound {
        /// The requested attribute name.
        name: String,
    },

    /// Parallel input arrays differ in length.
    #[error("parallel arrays differ in length: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first array.
        left: usize,
        /// Length of the second array.
        right: usize,
    },

    /// The mutable and compressed representations disagree.
    ///
    /// Always a bug in this crate, never recoverable by the caller.
    #[error("internal storage desync: {detail}")]
    InvariantViolated {
        /// What the consistency check found.
        detail: &'static str,
    },
}
