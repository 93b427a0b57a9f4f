//! Nodes, edges and the quantized coordinate key.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in space tracked by a graph.
///
/// The id is minted by the owning graph on first insertion of the
/// coordinate and is dense in `[0, N)`. Two coordinates are the same node
/// when they agree after rounding to the graph's precision.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    /// Dense id assigned by the owning graph.
    pub id: u32,
    /// The node's position.
    pub position: Point3<f32>,
    /// Optional application-defined classifier.
    pub tag: Option<i32>,
}

/// A directed edge out of a parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    /// Id of the child node.
    pub child: u32,
    /// Edge score in the default cost layer.
    pub score: f32,
    /// Integer step-type classifier.
    pub step_type: i32,
}

/// Round a coordinate to `precision` fractional digits and return the
/// integer image used for hashing and equality.
///
/// Rounding runs in `f64` so the scale factor does not lose bits, and uses
/// round-half-to-even to match the equality the hash implies.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn quantize(position: &Point3<f32>, precision: u32) -> [i64; 3] {
    #[allow(clippy::cast_possible_wrap)]
    let scale = 10f64.powi(precision as i32);
    [
        (f64::from(position.x) * scale).round_ties_even() as i64,
        (f64::from(position.y) * scale).round_ties_even() as i64,
        (f64::from(position.z) * scale).round_ties_even() as i64,
    ]
}
