//! BDeCat — level counts and penalty table for categorical data.
//!
//! The categorical score's log-gamma terms depend on the level counts of the
//! child and of its parents, so they are evaluated per node by the scorer.
//! What can be precomputed is the level-count vector and the per-parent
//! penalty table `−i·ln(pf)`.
use crate::score::{
    core::{
        options::BdeCatOptions,
        validation::{observed_levels, validate_explicit_levels},
    },
    errors::ScoreResult,
};
use ndarray::{Array1, ArrayView2};

/// `BdeCatStats` — level counts and score constants.
///
/// Fields
/// ------
/// - `chi`: total pseudo-count.
/// - `edgepf`: per-parent penalty factor `pf`.
/// - `levels`: number of levels of each variable (`Cvec`).
/// - `score_consts`: `−i·ln(pf)` for `i = 0..n` parents.
#[derive(Debug, Clone, PartialEq)]
pub struct BdeCatStats {
    pub chi: f64,
    pub edgepf: f64,
    pub levels: Vec<usize>,
    pub score_consts: Array1<f64>,
}

/// Compute BDeCat statistics.
///
/// Level counts come from `opts.levels` when supplied (checked against the
/// data) and otherwise from the data as `max + 1`, in which case every level
/// in `0..=max` must occur.
///
/// Errors
/// ------
/// - `ScoreError::InvalidHyperparameter` for `chi ≤ 0` or `edgepf ≤ 0`.
/// - `ScoreError::InvalidCategoricalValue`, `CategoricalLevelGap`,
///   `LevelCountMismatch`, `LevelTooSmall` from the level checks.
pub fn compute_bdecat(data: ArrayView2<f64>, opts: &BdeCatOptions) -> ScoreResult<BdeCatStats> {
    let opts = opts.resolve()?;
    let levels = match &opts.levels {
        Some(explicit) => {
            validate_explicit_levels(data, explicit)?;
            explicit.clone()
        }
        None => observed_levels(data)?.into_iter().map(|l| l.unwrap_or(1)).collect(),
    };

    let log_pf = opts.edgepf.ln();
    let score_consts = Array1::from_iter((0..data.ncols()).map(|i| -(i as f64) * log_pf));
    Ok(BdeCatStats { chi: opts.chi, edgepf: opts.edgepf, levels, score_consts })
}
