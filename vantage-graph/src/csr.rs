//! Compressed-sparse-row storage for edge scores.

use crate::GraphError;

/// A compressed-sparse-row view of a graph's edge scores.
///
/// For an `N`-node graph, row `i` of the implied `N×N` matrix lists the
/// outgoing edges of node `i`:
///
/// - `data[k]` - score of the `k`-th stored edge, row-major
/// - `inner_indices[k]` - child id of the `k`-th stored edge
/// - `outer_indices[i]..outer_indices[i + 1]` - the slice of `k` belonging
///   to row `i`; `outer_indices` has `N + 1` entries and ends at `nnz`
///
/// Child ids are strictly ascending within each row.
#[derive(Debug, Clone, PartialEq)]
pub struct Csr {
    data: Vec<f32>,
    inner_indices: Vec<u32>,
    outer_indices: Vec<usize>,
}

impl Csr {
    pub(crate) fn new(data: Vec<f32>, inner_indices: Vec<u32>, outer_indices: Vec<usize>) -> Self {
        Self {
            data,
            inner_indices,
            outer_indices,
        }
    }

    /// Number of stored edges.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Number of rows in the implied matrix (the graph's node count).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.outer_indices.len().saturating_sub(1)
    }

    /// Number of columns in the implied matrix; equal to [`rows`](Self::rows).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.rows()
    }

    /// Edge scores in row-major order.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Child id per stored edge.
    #[must_use]
    pub fn inner_indices(&self) -> &[u32] {
        &self.inner_indices
    }

    /// Row-start offsets; `N + 1` entries, the last equals [`nnz`](Self::nnz).
    #[must_use]
    pub fn outer_indices(&self) -> &[usize] {
        &self.outer_indices
    }

    /// The child ids and scores of row `i`, or `None` when out of range.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<(&[u32], &[f32])> {
        let start = *self.outer_indices.get(i)?;
        let end = *self.outer_indices.get(i + 1)?;
        Some((&self.inner_indices[start..end], &self.data[start..end]))
    }

    /// Check the structural invariants of the layout.
    pub(crate) fn validate(&self) -> Result<(), GraphError> {
        if self.outer_indices.last() != Some(&self.nnz()) {
            return Err(GraphError::InvariantViolated {
                detail: "outer_indices does not end at nnz",
            });
        }
        if self.outer_indices.windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphError::InvariantViolated {
                detail: "outer_indices is not monotonic",
            });
        }
        for i in 0..self.rows() {
            let (children, _) = self.row(i).ok_or(GraphError::InvariantViolated {
                detail: "row slice out of range",
            })?;
            if children.windows(2).any(|w| w[0] >= w[1]) {
                return Err(GraphError::InvariantViolated {
                    detail: "row children are not strictly increasing",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample() -> Csr {
        // 0 -> {1: 1.0, 2: 2.0}, 1 -> {}, 2 -> {0: 3.0}
        Csr::new(vec![1.0, 2.0, 3.0], vec![1, 2, 0], vec![0, 2, 2, 3])
    }

    #[test]
    fn test_shape() {
        let csr = sample();
        assert_eq!(csr.nnz(), 3);
        assert_eq!(csr.rows(), 3);
        assert_eq!(csr.cols(), 3);
    }

    #[test]
    fn test_row_access() {
        let csr = sample();
        assert_eq!(csr.row(0).unwrap(), (&[1u32, 2][..], &[1.0f32, 2.0][..]));
        assert_eq!(csr.row(1).unwrap(), (&[][..], &[][..]));
        assert_eq!(csr.row(2).unwrap(), (&[0u32][..], &[3.0f32][..]));
        assert!(csr.row(3).is_none());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_row() {
        let csr = Csr::new(vec![1.0, 2.0], vec![2, 1], vec![0, 2]);
        assert!(matches!(
            csr.validate(),
            Err(GraphError::InvariantViolated { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_tail() {
        let csr = Csr::new(vec![1.0], vec![0], vec![0, 2]);
        assert!(matches!(
            csr.validate(),
            Err(GraphError::InvariantViolated { .. })
        ));
    }
}
