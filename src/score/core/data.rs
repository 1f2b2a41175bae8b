//! Tabular score data and the missing-data filter.
//!
//! Purpose
//! -------
//! Provide the input container [`ScoreData`] (a numeric design matrix plus
//! optional column names) and the row filter [`filter_missing`] that removes
//! observations containing missing values while keeping an optional weight
//! vector in lock-step.
//!
//! Key behaviors
//! -------------
//! - [`ScoreData::with_column_names`] checks that one name is supplied per
//!   column; [`ScoreData::usable_column_names`] reports names only when all
//!   are non-empty and pairwise distinct.
//! - [`filter_missing`] never fails and reports how many rows it dropped.
//! - [`select_columns`] and [`stack_rows`] are the column/row reshaping
//!   primitives used by the dynamic layering engine.
//!
//! Conventions
//! -----------
//! - Rows are observations, columns are variables; indices are 0-based.
//! - A missing value is any `NaN` entry.
use crate::score::errors::{ScoreError, ScoreResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::HashSet;

/// `ScoreData` — design matrix with optional column names.
///
/// Fields
/// ------
/// - `values`: `Array2<f64>`
///   Observations × variables. `NaN` marks a missing value.
/// - `column_names`: `Option<Vec<String>>`
///   One name per column when present.
///
/// Invariants
/// ----------
/// - When `column_names` is `Some(v)`, `v.len() == values.ncols()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreData {
    pub values: Array2<f64>,
    pub column_names: Option<Vec<String>>,
}

impl ScoreData {
    /// Wrap an unnamed design matrix.
    pub fn new(values: Array2<f64>) -> ScoreData {
        ScoreData { values, column_names: None }
    }

    /// Wrap a design matrix together with its column names.
    ///
    /// Errors
    /// ------
    /// - `ScoreError::ColumnNameCountMismatch`
    ///   Returned when `names.len() != values.ncols()`.
    pub fn with_column_names(values: Array2<f64>, names: Vec<String>) -> ScoreResult<ScoreData> {
        if names.len() != values.ncols() {
            return Err(ScoreError::ColumnNameCountMismatch {
                expected: values.ncols(),
                found: names.len(),
            });
        }
        Ok(ScoreData { values, column_names: Some(names) })
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Column names if every name is non-empty and all names are distinct.
    pub fn usable_column_names(&self) -> Option<&[String]> {
        let names = self.column_names.as_deref()?;
        let mut seen = HashSet::with_capacity(names.len());
        for name in names {
            if name.trim().is_empty() || !seen.insert(name.as_str()) {
                return None;
            }
        }
        Some(names)
    }
}

/// Outcome of [`filter_missing`].
///
/// Fields
/// ------
/// - `matrix`: rows of the input without any `NaN`.
/// - `weights`: matching weight entries, when weights were supplied.
/// - `removed`: number of dropped rows, in `0..=nrows`.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingFilter {
    pub matrix: Array2<f64>,
    pub weights: Option<Array1<f64>>,
    pub removed: usize,
}

/// Remove every row holding at least one missing value.
///
/// Parameters
/// ----------
/// - `matrix`: `ArrayView2<f64>`
///   Design matrix; `NaN` marks missing entries.
/// - `weights`: `Option<ArrayView1<f64>>`
///   Optional per-row weights. Callers guarantee
///   `weights.len() == matrix.nrows()`.
///
/// Returns
/// -------
/// `MissingFilter`
///   The complete rows, their weights, and the number of dropped rows. Row
///   order is preserved.
///
/// Panics
/// ------
/// - Never panics for weight vectors of matching length.
pub fn filter_missing(matrix: ArrayView2<f64>, weights: Option<ArrayView1<f64>>) -> MissingFilter {
    debug_assert!(weights.is_none_or(|w| w.len() == matrix.nrows()));
    let keep: Vec<usize> = matrix
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().all(|v| !v.is_nan()))
        .map(|(i, _)| i)
        .collect();
    let removed = matrix.nrows() - keep.len();

    let filtered = matrix.select(Axis(0), &keep);
    let filtered_weights = weights.map(|w| w.select(Axis(0), &keep));

    if removed > 0 {
        tracing::debug!(removed, kept = keep.len(), "dropped rows with missing values");
    }
    MissingFilter { matrix: filtered, weights: filtered_weights, removed }
}

/// Position of the first missing value, scanning row by row.
pub fn first_missing(matrix: ArrayView2<f64>) -> Option<(usize, usize)> {
    matrix.indexed_iter().find(|(_, v)| v.is_nan()).map(|(idx, _)| idx)
}

/// Copy the listed columns, in the listed order.
pub fn select_columns(matrix: ArrayView2<f64>, columns: &[usize]) -> Array2<f64> {
    matrix.select(Axis(1), columns)
}

/// Stack blocks with identical column counts on top of each other.
///
/// Errors
/// ------
/// - `ScoreError::ColumnCountMismatch`
///   Returned when a block's column count differs from the first block's.
///   An empty `blocks` slice yields a `0×0` matrix.
pub fn stack_rows(blocks: &[Array2<f64>]) -> ScoreResult<Array2<f64>> {
    let Some(first) = blocks.first() else {
        return Ok(Array2::zeros((0, 0)));
    };
    if let Some(bad) = blocks.iter().find(|b| b.ncols() != first.ncols()) {
        return Err(ScoreError::ColumnCountMismatch { expected: first.ncols(), found: bad.ncols() });
    }
    let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
    ndarray::concatenate(Axis(0), &views).map_err(|_| ScoreError::ColumnCountMismatch {
        expected: first.ncols(),
        found: first.ncols(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Column-name handling on `ScoreData`.
    // - `filter_missing` with and without weights, including the all-missing
    //   and nothing-missing boundaries.
    // - `stack_rows` on slice blocks.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure column names are rejected when their count is wrong.
    //
    // Given
    // -----
    // - A 2×3 matrix and two names.
    //
    // Expect
    // ------
    // - `ColumnNameCountMismatch { expected: 3, found: 2 }`.
    fn with_column_names_rejects_wrong_length() {
        let values = Array2::<f64>::zeros((2, 3));
        let names = vec!["a".to_string(), "b".to_string()];

        let result = ScoreData::with_column_names(values, names);

        assert_eq!(result.unwrap_err(), ScoreError::ColumnNameCountMismatch { expected: 3, found: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Verify that duplicate or blank names make the names unusable.
    //
    // Given
    // -----
    // - Names `["a", "a"]` and names `["a", ""]`.
    //
    // Expect
    // ------
    // - `usable_column_names()` is `None` for both; distinct names pass.
    fn usable_column_names_requires_distinct_non_empty_names() {
        let values = Array2::<f64>::zeros((1, 2));
        let dup = ScoreData::with_column_names(values.clone(), vec!["a".into(), "a".into()]).unwrap();
        let blank = ScoreData::with_column_names(values.clone(), vec!["a".into(), "".into()]).unwrap();
        let good = ScoreData::with_column_names(values, vec!["a".into(), "b".into()]).unwrap();

        assert!(dup.usable_column_names().is_none());
        assert!(blank.usable_column_names().is_none());
        assert_eq!(good.usable_column_names().map(|n| n.len()), Some(2));
    }

    #[test]
    // Purpose
    // -------
    // Check that rows with a NaN are dropped together with their weights.
    //
    // Given
    // -----
    // - A 4×2 matrix with NaN in rows 1 and 3, weights `[1, 2, 3, 4]`.
    //
    // Expect
    // ------
    // - Rows 0 and 2 survive, weights `[1, 3]`, `removed == 2`.
    fn filter_missing_drops_rows_and_weights_in_lock_step() {
        let m = array![[1.0, 2.0], [f64::NAN, 0.0], [3.0, 4.0], [5.0, f64::NAN]];
        let w = array![1.0, 2.0, 3.0, 4.0];

        let out = filter_missing(m.view(), Some(w.view()));

        assert_eq!(out.matrix, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(out.weights, Some(array![1.0, 3.0]));
        assert_eq!(out.removed, 2);
    }

    #[test]
    // Purpose
    // -------
    // Cover the boundaries: nothing missing and everything missing.
    //
    // Given
    // -----
    // - A complete 2×2 matrix and an all-NaN 2×1 matrix, no weights.
    //
    // Expect
    // ------
    // - `removed == 0` with the matrix unchanged; `removed == 2` with zero
    //   rows left.
    fn filter_missing_handles_boundaries() {
        let complete = array![[1.0, 2.0], [3.0, 4.0]];
        let empty = array![[f64::NAN], [f64::NAN]];

        let kept = filter_missing(complete.view(), None);
        let dropped = filter_missing(empty.view(), None);

        assert_eq!(kept.removed, 0);
        assert_eq!(kept.matrix, complete);
        assert!(kept.weights.is_none());
        assert_eq!(dropped.removed, 2);
        assert_eq!(dropped.matrix.nrows(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Verify `first_missing` reports the first NaN in row-major order.
    //
    // Given
    // -----
    // - NaN at (1, 0) and (0, 2).
    //
    // Expect
    // ------
    // - `Some((0, 2))`.
    fn first_missing_scans_row_major() {
        let m = array![[1.0, 2.0, f64::NAN], [f64::NAN, 1.0, 1.0]];

        assert_eq!(first_missing(m.view()), Some((0, 2)));
    }

    #[test]
    // Purpose
    // -------
    // Check row stacking preserves block order.
    //
    // Given
    // -----
    // - Two 1×2 blocks.
    //
    // Expect
    // ------
    // - A 2×2 matrix with the first block on top.
    fn stack_rows_preserves_order() {
        let blocks = vec![array![[1.0, 2.0]], array![[3.0, 4.0]]];

        assert_eq!(stack_rows(&blocks).unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
    }
}
