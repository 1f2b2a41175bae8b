//! BDe — Dirichlet pseudo-count tables for binary data.
//!
//! Purpose
//! -------
//! Precompute the weighted positive and negative indicator matrices
//! `d1 = data·w` and `d0 = (1 − data)·w` together with the score-constant
//! table of the binary Dirichlet-multinomial (BDe) score. A downstream scorer
//! only has to aggregate `d1`/`d0` per parent configuration.
//!
//! Key behaviors
//! -------------
//! - Row `r` of `d1` and `d0` is scaled by `w[r]` (unit weights when absent).
//! - For `i` parents (`q = 2^i` configurations) the constant is
//!   `q·lnΓ(chi/q) − 2q·lnΓ(chi/(2q)) − i·ln(pf)`; the zero-parent entry never
//!   depends on `pf`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is complete and binary; the check is repeated here so that the
//!   computer is safe to call on its own.
use crate::score::{
    core::{options::BdeOptions, validation::validate_binary},
    errors::ScoreResult,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use statrs::function::gamma::ln_gamma;

/// `BdeStats` — weighted indicator matrices and score constants.
///
/// Fields
/// ------
/// - `chi`: total pseudo-count.
/// - `edgepf`: per-parent penalty factor `pf`.
/// - `d1`, `d0`: `rows × n` weighted indicators of ones and zeros.
/// - `score_consts`: length-`n` table indexed by parent count `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct BdeStats {
    pub chi: f64,
    pub edgepf: f64,
    pub d1: Array2<f64>,
    pub d0: Array2<f64>,
    pub score_consts: Array1<f64>,
}

/// Compute BDe statistics.
///
/// Errors
/// ------
/// - `ScoreError::InvalidHyperparameter` for `chi ≤ 0` or `edgepf ≤ 0`.
/// - `ScoreError::NonBinaryValue` for a value outside `{0, 1}`.
pub fn compute_bde(
    data: ArrayView2<f64>, weights: Option<ArrayView1<f64>>, opts: &BdeOptions,
) -> ScoreResult<BdeStats> {
    let opts = opts.resolve()?;
    validate_binary(data)?;

    let ones = data.to_owned();
    let zeros = data.mapv(|v| 1.0 - v);
    let (d1, d0) = match weights {
        None => (ones, zeros),
        Some(w) => {
            let col = w.insert_axis(Axis(1));
            (&ones * &col, &zeros * &col)
        }
    };

    Ok(BdeStats {
        chi: opts.chi,
        edgepf: opts.edgepf,
        d1,
        d0,
        score_consts: bde_score_constants(data.ncols(), opts.chi, opts.edgepf),
    })
}

/// Score constants for `0..n` parents.
pub fn bde_score_constants(n: usize, chi: f64, edgepf: f64) -> Array1<f64> {
    let log_pf = edgepf.ln();
    Array1::from_iter((0..n).map(|i| {
        let q = 2f64.powi(i as i32);
        q * ln_gamma(chi / q) - 2.0 * q * ln_gamma(chi / (2.0 * q)) - i as f64 * log_pf
    }))
}
