//! BGe — Normal-Wishart sufficient statistics for continuous data.
//!
//! Purpose
//! -------
//! Compute, once per design matrix, every quantity the Gaussian (BGe) local
//! score needs: effective sample size, mean vector, scatter matrix, the
//! posterior Normal-Wishart parameters, and the table of score constants
//! indexed by parent-set size. A downstream scorer then evaluates any local
//! score from a submatrix of `TN` and one table lookup.
//!
//! Key behaviors
//! -------------
//! - Unweighted data: `N = rows`, scatter = sample covariance × `(N − 1)`.
//! - Weighted data: `N = Σ w`, scatter = weighted ML covariance × `N`.
//! - Prior mean `μ₀ = 0`, prior scatter `T₀ = T0scale · I` with
//!   `T0scale = am·(aw − n − 1)/(am + 1)`.
//! - `TN = T₀ + scatter + am·N/(am + N) · (μ₀ − x̄)(μ₀ − x̄)ᵀ`,
//!   `awpN = aw + N`, `muN = (N·x̄ + am·μ₀)/(N + am)`,
//!   `SigmaN = TN/(awpN − n − 1)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is complete (no `NaN`) and has at least one row; hyperparameters
//!   come from [`BgeOptions::resolve`](crate::score::core::options::BgeOptions::resolve).
//! - Entry `k` of `score_consts` (0-based) belongs to parent sets of size
//!   `k`, for `k = 0..n`.
//!
//! Performance
//! -----------
//! - One O(rows·n²) pass for the scatter matrix; the table is O(n).
use crate::score::core::options::ResolvedBge;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use statrs::function::gamma::ln_gamma;

/// `BgeStats` — posterior Normal-Wishart parameters and score constants.
///
/// Fields
/// ------
/// - `am`, `aw`, `edgepf`: resolved hyperparameters.
/// - `n_eff`: effective sample size `N`.
/// - `means`: (weighted) column means, length `n`.
/// - `scatter`: (weighted) centered cross-product matrix, `n×n`.
/// - `t0_scale`: diagonal of the prior scatter `T₀`.
/// - `tn`: posterior scatter `TN`, `n×n`.
/// - `awpn`: posterior degrees of freedom `aw + N`.
/// - `mu_n`: posterior mean, length `n`.
/// - `sigma_n`: posterior covariance mode `TN/(awpN − n − 1)`.
/// - `score_consts`: length-`n` table indexed by parent count.
#[derive(Debug, Clone, PartialEq)]
pub struct BgeStats {
    pub am: f64,
    pub aw: f64,
    pub edgepf: f64,
    pub n_eff: f64,
    pub means: Array1<f64>,
    pub scatter: Array2<f64>,
    pub t0_scale: f64,
    pub tn: Array2<f64>,
    pub awpn: f64,
    pub mu_n: Array1<f64>,
    pub sigma_n: Array2<f64>,
    pub score_consts: Array1<f64>,
}

/// Compute BGe statistics for a complete design matrix.
///
/// Parameters
/// ----------
/// - `data`: `ArrayView2<f64>`
///   Complete `rows × n` design matrix, `rows ≥ 1`.
/// - `weights`: `Option<ArrayView1<f64>>`
///   Optional strictly positive per-row weights of length `rows`.
/// - `hyper`: [`ResolvedBge`]
///   Validated `am`, `aw`, `edgepf`.
///
/// Returns
/// -------
/// `BgeStats`
///   The fully populated statistics; deterministic for identical inputs.
pub fn compute_bge(
    data: ArrayView2<f64>, weights: Option<ArrayView1<f64>>, hyper: ResolvedBge,
) -> BgeStats {
    let n = data.ncols();
    let nf = n as f64;
    let ResolvedBge { am, aw, edgepf } = hyper;

    let (n_eff, means, scatter) = match weights {
        None => {
            let n_eff = data.nrows() as f64;
            let means = data.sum_axis(Axis(0)) / n_eff;
            let centered = &data - &means;
            let scatter = centered.t().dot(&centered);
            (n_eff, means, scatter)
        }
        Some(w) => {
            let n_eff = w.sum();
            let means = w.dot(&data) / n_eff;
            let centered = &data - &means;
            let weighted = &centered * &w.insert_axis(Axis(1));
            let scatter = weighted.t().dot(&centered);
            (n_eff, means, scatter)
        }
    };

    let mu0 = Array1::<f64>::zeros(n);
    let t0_scale = am * (aw - nf - 1.0) / (am + 1.0);
    let diff = &mu0 - &means;
    let outer = diff.view().insert_axis(Axis(1)).dot(&diff.view().insert_axis(Axis(0)));
    let tn = Array2::<f64>::eye(n) * t0_scale + &scatter + outer * ((am * n_eff) / (am + n_eff));

    let awpn = aw + n_eff;
    let mu_n = (&means * n_eff + &mu0 * am) / (n_eff + am);
    let sigma_n = &tn / (awpn - nf - 1.0);
    let score_consts = score_constants(n, n_eff, am, aw, t0_scale);

    BgeStats {
        am,
        aw,
        edgepf,
        n_eff,
        means,
        scatter,
        t0_scale,
        tn,
        awpn,
        mu_n,
        sigma_n,
        score_consts,
    }
}

/// Parent-size dependent normalizing terms of the BGe marginal likelihood.
///
/// For `k` parents (`j = k + 1`, `awp = aw − n + j`):
/// `−(N/2)·ln π + ½·ln(am/(am+N)) − lnΓ(awp/2) + lnΓ((awp+N)/2) + ((awp+j−1)/2)·ln T0scale`.
fn score_constants(n: usize, n_eff: f64, am: f64, aw: f64, t0_scale: f64) -> Array1<f64> {
    let const_fact = -(n_eff / 2.0) * std::f64::consts::PI.ln() + 0.5 * (am / (am + n_eff)).ln();
    let log_t0 = t0_scale.ln();
    Array1::from_iter((1..=n).map(|j| {
        let jf = j as f64;
        let awp = aw - n as f64 + jf;
        const_fact - ln_gamma(awp / 2.0) + ln_gamma((awp + n_eff) / 2.0)
            + ((awp + jf - 1.0) / 2.0) * log_t0
    }))
}
