//! Edge penalties — element-wise log transform of a prior penalty matrix.
//!
//! An edge-penalty matrix holds one strictly positive multiplicative factor
//! per (parent, child) pair of the adjacency space. Scores work in log space,
//! so the builder stores `ln(penalty)` and the local scorer subtracts the
//! entries of the chosen parents.
use crate::score::errors::{ScoreError, ScoreResult};
use ndarray::{Array2, ArrayView2};

/// Validate a `dim × dim` penalty matrix and return its element-wise log.
///
/// Errors
/// ------
/// - `ScoreError::PenaltyShapeMismatch` when the matrix is not `dim × dim`.
/// - `ScoreError::NonPositivePenalty` for the first entry that is `≤ 0`,
///   `NaN` or infinite.
pub fn log_edge_penalty(penalty: ArrayView2<f64>, dim: usize) -> ScoreResult<Array2<f64>> {
    check_penalty(penalty, dim)?;
    Ok(penalty.mapv(f64::ln))
}

/// Shape and positivity checks shared by static and dynamic penalties.
pub fn check_penalty(penalty: ArrayView2<f64>, dim: usize) -> ScoreResult<()> {
    if penalty.nrows() != dim || penalty.ncols() != dim {
        return Err(ScoreError::PenaltyShapeMismatch {
            expected: dim,
            rows: penalty.nrows(),
            cols: penalty.ncols(),
        });
    }
    if let Some(((row, col), &value)) =
        penalty.indexed_iter().find(|(_, v)| !v.is_finite() || **v <= 0.0)
    {
        return Err(ScoreError::NonPositivePenalty { row, col, value });
    }
    Ok(())
}

/// Reorder rows and columns with the same permutation.
pub fn permute_square(matrix: ArrayView2<f64>, order: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((order.len(), order.len()), |(i, j)| matrix[[order[i], order[j]]])
}
