//! Score validation helpers — reusable checks for data, weights and nodes.
//!
//! Purpose
//! -------
//! Centralize the input guards of the score-parameter builder so that every
//! family computer and the dynamic layering engine fail fast with the same
//! structured errors.
//!
//! Key behaviors
//! -------------
//! - Reject missing values in static designs ([`validate_complete`]).
//! - Check weight vectors for length and strict positivity.
//! - Check background node lists and split nodes into background and main.
//! - Check binary and categorical value domains, reading off categorical
//!   level counts when none are supplied.
//!
//! Invariants & assumptions
//! ------------------------
//! - Value-domain checks skip `NaN` entries: in dynamic mode missing values
//!   are dropped later by the layering engine, and static designs have been
//!   checked by [`validate_complete`] first.
//!
//! Conventions
//! -----------
//! - Validation functions return [`ScoreResult`] and never panic on invalid
//!   inputs. No logging happens here.
use crate::score::{
    core::data::first_missing,
    errors::{ScoreError, ScoreResult},
};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Reject any missing value in a static design matrix.
pub fn validate_complete(matrix: ArrayView2<f64>) -> ScoreResult<()> {
    match first_missing(matrix) {
        Some((row, col)) => Err(ScoreError::MissingData { row, col }),
        None => Ok(()),
    }
}

/// Reject empty design matrices.
pub fn validate_non_empty(matrix: ArrayView2<f64>) -> ScoreResult<()> {
    if matrix.nrows() == 0 || matrix.ncols() == 0 {
        return Err(ScoreError::EmptyData { rows: matrix.nrows(), cols: matrix.ncols() });
    }
    Ok(())
}

/// Check that weights match the row count and are finite and > 0.
pub fn validate_weights(weights: Option<&Array1<f64>>, rows: usize) -> ScoreResult<()> {
    let Some(w) = weights else {
        return Ok(());
    };
    if w.len() != rows {
        return Err(ScoreError::WeightLengthMismatch { expected: rows, found: w.len() });
    }
    for (index, &value) in w.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ScoreError::InvalidWeight { index, value });
        }
    }
    Ok(())
}

/// Split `0..n` into sorted background and main node lists.
///
/// Errors
/// ------
/// - `ScoreError::InvalidBackgroundNode` for an index `≥ n`.
/// - `ScoreError::DuplicateBackgroundNode` for a repeated index.
pub fn split_nodes(background: &[usize], n: usize) -> ScoreResult<(Vec<usize>, Vec<usize>)> {
    let mut is_background = vec![false; n];
    for &index in background {
        if index >= n {
            return Err(ScoreError::InvalidBackgroundNode { index, n });
        }
        if is_background[index] {
            return Err(ScoreError::DuplicateBackgroundNode(index));
        }
        is_background[index] = true;
    }
    let (bg, main): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| is_background[i]);
    Ok((bg, main))
}

/// Check that every observed value is `0` or `1`.
pub fn validate_binary(matrix: ArrayView2<f64>) -> ScoreResult<()> {
    for ((row, col), &value) in matrix.indexed_iter() {
        if !value.is_nan() && value != 0.0 && value != 1.0 {
            return Err(ScoreError::NonBinaryValue { row, col, value });
        }
    }
    Ok(())
}

/// Read per-column level counts off categorical data.
///
/// Returns `max + 1` for every column with at least one observed value and
/// `None` for columns that are entirely missing.
///
/// Errors
/// ------
/// - `ScoreError::InvalidCategoricalValue`
///   Returned for negative, non-integer or infinite values.
/// - `ScoreError::CategoricalLevelGap`
///   Returned when some level in `0..=max` is never observed.
pub fn observed_levels(matrix: ArrayView2<f64>) -> ScoreResult<Vec<Option<usize>>> {
    matrix
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(col, column)| column_levels(column, col))
        .collect()
}

/// Check explicit level counts against the data.
///
/// Errors
/// ------
/// - `ScoreError::LevelCountMismatch` when `levels.len() != ncols`.
/// - `ScoreError::InvalidCategoricalValue` for malformed values.
/// - `ScoreError::LevelTooSmall` when a value is not below its level count.
pub fn validate_explicit_levels(matrix: ArrayView2<f64>, levels: &[usize]) -> ScoreResult<()> {
    if levels.len() != matrix.ncols() {
        return Err(ScoreError::LevelCountMismatch { expected: matrix.ncols(), found: levels.len() });
    }
    for (col, column) in matrix.axis_iter(Axis(1)).enumerate() {
        if let Some(observed_max) = column_max(column, col)? {
            if observed_max >= levels[col] {
                return Err(ScoreError::LevelTooSmall { col, levels: levels[col], observed_max });
            }
        }
    }
    Ok(())
}

// ---- Helper methods ----

fn column_max(column: ArrayView1<f64>, col: usize) -> ScoreResult<Option<usize>> {
    let mut max: Option<usize> = None;
    for (row, &value) in column.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(ScoreError::InvalidCategoricalValue { row, col, value });
        }
        let level = value as usize;
        max = Some(max.map_or(level, |m| m.max(level)));
    }
    Ok(max)
}

fn column_levels(column: ArrayView1<f64>, col: usize) -> ScoreResult<Option<usize>> {
    let Some(max) = column_max(column, col)? else {
        return Ok(None);
    };
    // `count` observed values cover at most `count` levels, so any level
    // above `count` already implies a gap at or below `count`.
    let count = column.iter().filter(|v| !v.is_nan()).count();
    let bound = max.min(count);
    let mut seen = vec![false; bound + 1];
    for &value in column.iter().filter(|v| !v.is_nan()) {
        let level = value as usize;
        if level <= bound {
            seen[level] = true;
        }
    }
    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(ScoreError::CategoricalLevelGap { col, missing });
    }
    Ok(Some(bound + 1))
}
