//! Local scores — the scoring contract and a conjugate reference scorer.
//!
//! Purpose
//! -------
//! Define [`LocalScore`], the seam through which structure-search code
//! evaluates the log marginal likelihood of one node given a parent set, and
//! provide [`ConjugateScore`], which evaluates the closed-form BGe, BDe and
//! BDeCat local scores from a static [`ScoreParameters`] object.
//!
//! Key behaviors
//! -------------
//! - BGe: Cholesky factor of `TN[parents, parents]` (via `nalgebra`), one
//!   triangular solve, and the precomputed constant of the parent count.
//! - BDe: weighted counts per observed parent configuration; unobserved
//!   configurations contribute a closed-form term instead of being
//!   enumerated.
//! - BDeCat: weighted counts per observed configuration and child level.
//! - Every score is reduced by `Σ ln(penalty[parent, node])` when the object
//!   carries an edge-penalty matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only static objects are scored. Dynamic objects are scored through
//!   their slice children ([`DynamicParams::first_slice`],
//!   [`DynamicParams::transition`]).
//! - Background nodes have no parents; asking for a background node with a
//!   non-empty parent set is an error, with an empty set it scores normally.
//!
//! [`DynamicParams::first_slice`]: crate::score::params::DynamicParams::first_slice
//! [`DynamicParams::transition`]: crate::score::params::DynamicParams::transition
use crate::score::{
    errors::{ScoreError, ScoreResult},
    families::{bde::BdeStats, bdecat::BdeCatStats, bge::BgeStats},
    params::{FamilyStats, ParamsBody, ScoreParameters},
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use statrs::function::gamma::ln_gamma;
use std::collections::{BTreeMap, HashSet};

/// Largest parent set the binary scorer can key in one `u64`.
pub const MAX_BINARY_PARENTS: usize = 63;

/// Log marginal likelihood of a node given its parents.
///
/// Implementations must be deterministic: the same node, parent set and
/// parameter object always give the same value.
pub trait LocalScore {
    fn local_score(
        &self, node: usize, parents: &[usize], params: &ScoreParameters,
    ) -> ScoreResult<f64>;
}

/// Closed-form scorer for the BGe, BDe and BDeCat families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConjugateScore;

impl LocalScore for ConjugateScore {
    /// Score `node | parents`.
    ///
    /// Errors
    /// ------
    /// - `ScoreError::DynamicRequiresSlice` for dynamic objects.
    /// - `ScoreError::UserDefinedScore` for the user-defined family.
    /// - `ScoreError::NodeOutOfRange` / `InvalidParentSet` for bad indices.
    /// - `ScoreError::TooManyParents` for binary parent sets above
    ///   [`MAX_BINARY_PARENTS`].
    /// - `ScoreError::NotPositiveDefinite` when the BGe block cannot be
    ///   factorized.
    fn local_score(
        &self, node: usize, parents: &[usize], params: &ScoreParameters,
    ) -> ScoreResult<f64> {
        let stats = match params.body() {
            ParamsBody::Static(stats) => stats,
            ParamsBody::Dynamic(_) => return Err(ScoreError::DynamicRequiresSlice),
        };
        check_parent_set(node, parents, params)?;

        let score = match stats {
            FamilyStats::Gaussian(s) => bge_local(s, params.node_count(), node, parents)?,
            FamilyStats::Binary(s) => bde_local(s, params.design_matrix(), node, parents)?,
            FamilyStats::Categorical(s) => {
                bdecat_local(s, params.design_matrix(), params.weights(), node, parents)
            }
            FamilyStats::UserDefined(_) => return Err(ScoreError::UserDefinedScore),
        };
        let penalty = params
            .log_edge_penalty()
            .map_or(0.0, |lp| parents.iter().map(|&p| lp[[p, node]]).sum::<f64>());
        Ok(score - penalty)
    }
}

fn check_parent_set(node: usize, parents: &[usize], params: &ScoreParameters) -> ScoreResult<()> {
    let n = params.node_count();
    if node >= n {
        return Err(ScoreError::NodeOutOfRange { node, n });
    }
    if !parents.is_empty() && params.is_background(node) {
        return Err(ScoreError::InvalidParentSet { node, reason: "background nodes take no parents" });
    }
    let mut seen = HashSet::with_capacity(parents.len());
    for &p in parents {
        if p >= n {
            return Err(ScoreError::NodeOutOfRange { node: p, n });
        }
        if p == node {
            return Err(ScoreError::InvalidParentSet { node, reason: "node is its own parent" });
        }
        if !seen.insert(p) {
            return Err(ScoreError::InvalidParentSet { node, reason: "duplicate parent" });
        }
    }
    Ok(())
}

fn bge_local(s: &BgeStats, n: usize, node: usize, parents: &[usize]) -> ScoreResult<f64> {
    let lp = parents.len();
    let awpnd2 = (s.awpn - n as f64 + lp as f64 + 1.0) / 2.0;
    let a = s.tn[[node, node]];

    let (residual, logdet_d) = if lp == 0 {
        (a, 0.0)
    } else {
        let d = DMatrix::from_fn(lp, lp, |i, j| s.tn[[parents[i], parents[j]]]);
        let b = DVector::from_fn(lp, |i, _| s.tn[[node, parents[i]]]);
        let chol = d.cholesky().ok_or(ScoreError::NotPositiveDefinite { node })?;
        let l = chol.l();
        let y = l.solve_lower_triangular(&b).ok_or(ScoreError::NotPositiveDefinite { node })?;
        let logdet_d = 2.0 * l.diagonal().iter().map(|v| v.ln()).sum::<f64>();
        (a - y.norm_squared(), logdet_d)
    };
    if !(residual > 0.0) {
        return Err(ScoreError::NotPositiveDefinite { node });
    }

    Ok(s.score_consts[lp] - awpnd2 * residual.ln() - logdet_d / 2.0
        - lp as f64 * s.edgepf.ln())
}

fn bde_local(s: &BdeStats, data: &Array2<f64>, node: usize, parents: &[usize]) -> ScoreResult<f64> {
    let lp = parents.len();
    if lp > MAX_BINARY_PARENTS {
        return Err(ScoreError::TooManyParents { count: lp, max: MAX_BINARY_PARENTS });
    }

    let mut counts: BTreeMap<u64, (f64, f64)> = BTreeMap::new();
    for row in 0..data.nrows() {
        let key = parents
            .iter()
            .enumerate()
            .fold(0u64, |acc, (bit, &p)| if data[[row, p]] == 1.0 { acc | (1 << bit) } else { acc });
        let cell = counts.entry(key).or_insert((0.0, 0.0));
        cell.0 += s.d1[[row, node]];
        cell.1 += s.d0[[row, node]];
    }

    let q = 2f64.powi(lp as i32);
    let a = s.chi / (2.0 * q);
    let observed: f64 = counts
        .values()
        .map(|&(n1, n0)| ln_gamma(n1 + a) + ln_gamma(n0 + a) - ln_gamma(n1 + n0 + 2.0 * a))
        .sum();
    let empty = (q - counts.len() as f64) * (2.0 * ln_gamma(a) - ln_gamma(2.0 * a));
    Ok(s.score_consts[lp] + observed + empty)
}

fn bdecat_local(
    s: &BdeCatStats, data: &Array2<f64>, weights: Option<&Array1<f64>>, node: usize,
    parents: &[usize],
) -> f64 {
    let r = s.levels[node];
    let q: f64 = parents.iter().map(|&p| s.levels[p] as f64).product();
    let alpha_config = s.chi / q;
    let alpha_cell = alpha_config / r as f64;

    let mut counts: BTreeMap<Vec<usize>, Vec<f64>> = BTreeMap::new();
    for row in 0..data.nrows() {
        let key: Vec<usize> = parents.iter().map(|&p| data[[row, p]] as usize).collect();
        let w = weights.map_or(1.0, |w| w[row]);
        counts.entry(key).or_insert_with(|| vec![0.0; r])[data[[row, node]] as usize] += w;
    }

    let observed: f64 = counts
        .values()
        .map(|cells| {
            let total: f64 = cells.iter().sum();
            ln_gamma(alpha_config) - ln_gamma(total + alpha_config)
                + cells.iter().map(|&c| ln_gamma(c + alpha_cell) - ln_gamma(alpha_cell)).sum::<f64>()
        })
        .sum();
    s.score_consts[parents.len()] + observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{
        builder::ScoreBuilder,
        core::{
            data::ScoreData,
            options::{BdeCatOptions, BdeOptions, BgeOptions, DynamicOptions, FamilyParams, ScoreFamily},
        },
    };
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - BGe scores for zero and one parent against the closed form.
    // - BDe and BDeCat scores against direct Dirichlet-multinomial sums.
    // - Edge-penalty subtraction.
    // - Every rejection branch of the scorer.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-9;

    fn gaussian(fp: FamilyParams) -> ScoreParameters {
        let data = ScoreData::new(Array2::from_shape_fn((15, 3), |(i, j)| {
            ((i * 3 + j * 5) % 7) as f64 + 0.5 * (i as f64).sin() * j as f64
        }));
        ScoreBuilder::new(ScoreFamily::Gaussian, &data).with_family_params(fp).build().unwrap()
    }

    fn bge(params: &ScoreParameters) -> &BgeStats {
        match params.stats() {
            Some(FamilyStats::Gaussian(s)) => s,
            other => panic!("expected Gaussian stats, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // BGe zero- and one-parent scores follow the closed form.
    //
    // Given
    // -----
    // - 15×3 continuous data, pf = 2.
    //
    // Expect
    // ------
    // - `score(1 | ∅) = c0 − (awpN − n + 1)/2 · ln TN11`.
    // - `score(1 | {0}) = c1 − (awpN − n + 2)/2 · ln(A − B²/D) − ln(D)/2 − ln 2`.
    fn bge_scores_match_closed_form() {
        let params = gaussian(FamilyParams { bge: BgeOptions::new(1.0, None, 2.0), ..Default::default() });
        let s = bge(&params);
        let n = 3.0;

        let empty = ConjugateScore.local_score(1, &[], &params).unwrap();
        let single = ConjugateScore.local_score(1, &[0], &params).unwrap();

        let a = s.tn[[1, 1]];
        let d = s.tn[[0, 0]];
        let b = s.tn[[1, 0]];
        let expected_empty = s.score_consts[0] - (s.awpn - n + 1.0) / 2.0 * a.ln();
        let expected_single = s.score_consts[1] - (s.awpn - n + 2.0) / 2.0 * (a - b * b / d).ln()
            - d.ln() / 2.0
            - 2.0_f64.ln();
        assert_relative_eq!(empty, expected_empty, epsilon = TOL);
        assert_relative_eq!(single, expected_single, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // Parent order does not change the BGe score.
    //
    // Given
    // -----
    // - Parent sets `[0, 2]` and `[2, 0]` for node 1.
    //
    // Expect
    // ------
    // - Equal scores up to rounding.
    fn bge_score_ignores_parent_order() {
        let params = gaussian(FamilyParams::default());

        let ab = ConjugateScore.local_score(1, &[0, 2], &params).unwrap();
        let ba = ConjugateScore.local_score(1, &[2, 0], &params).unwrap();

        assert_relative_eq!(ab, ba, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // BDe scores equal the explicit Dirichlet-multinomial sum, including
    // the term of an unobserved parent configuration.
    //
    // Given
    // -----
    // - Node 1 with parent 0; parent 0 is always 0 in the data.
    //
    // Expect
    // ------
    // - Zero parents: `lnΓ(χ) − lnΓ(N+χ) + Σ_v [lnΓ(N_v+χ/2) − lnΓ(χ/2)]`.
    // - One parent: the same per configuration with `χ/2`, `χ/4`, the
    //   empty configuration contributing zero, minus `ln pf`.
    fn bde_scores_match_direct_sum() {
        let data = ScoreData::new(array![[0.0, 1.0], [0.0, 1.0], [0.0, 0.0], [0.0, 1.0]]);
        let chi = 1.0;
        let fp = FamilyParams { bde: BdeOptions::new(chi, 2.0), ..Default::default() };
        let params =
            ScoreBuilder::new(ScoreFamily::Binary, &data).with_family_params(fp).build().unwrap();

        let empty = ConjugateScore.local_score(1, &[], &params).unwrap();
        let single = ConjugateScore.local_score(1, &[0], &params).unwrap();

        let dm = |n1: f64, n0: f64, alpha: f64| {
            ln_gamma(alpha) - ln_gamma(n1 + n0 + alpha) + ln_gamma(n1 + alpha / 2.0)
                - ln_gamma(alpha / 2.0)
                + ln_gamma(n0 + alpha / 2.0)
                - ln_gamma(alpha / 2.0)
        };
        assert_relative_eq!(empty, dm(3.0, 1.0, chi), epsilon = TOL);
        assert_relative_eq!(
            single,
            dm(3.0, 1.0, chi / 2.0) + dm(0.0, 0.0, chi / 2.0) - 2.0_f64.ln(),
            epsilon = TOL
        );
    }

    #[test]
    // Purpose
    // -------
    // BDeCat zero-parent score equals the Dirichlet-multinomial form.
    //
    // Given
    // -----
    // - A 3-level node observed as {0, 1, 1, 2, 2, 2}, chi = 0.5.
    //
    // Expect
    // ------
    // - `lnΓ(χ) − lnΓ(6+χ) + Σ_k [lnΓ(N_k + χ/3) − lnΓ(χ/3)]`.
    fn bdecat_zero_parent_score_matches_direct_sum() {
        let data = ScoreData::new(array![[0.0], [1.0], [1.0], [2.0], [2.0], [2.0]]);
        let params = ScoreBuilder::new(ScoreFamily::Categorical, &data).build().unwrap();
        let chi = BdeCatOptions::default().chi;

        let score = ConjugateScore.local_score(0, &[], &params).unwrap();

        let cell = chi / 3.0;
        let expected = ln_gamma(chi) - ln_gamma(6.0 + chi)
            + [1.0, 2.0, 3.0].iter().map(|&c| ln_gamma(c + cell) - ln_gamma(cell)).sum::<f64>();
        assert_relative_eq!(score, expected, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // Edge penalties are subtracted per chosen parent.
    //
    // Given
    // -----
    // - A 3×3 penalty with entry (0, 1) = e².
    //
    // Expect
    // ------
    // - `score(1 | {0})` drops by exactly 2 relative to the unpenalized
    //   object; the empty parent set is unchanged.
    fn edge_penalty_is_subtracted() {
        let data = ScoreData::new(Array2::from_shape_fn((12, 3), |(i, j)| ((i + 2 * j) % 5) as f64));
        let mut penalty = Array2::<f64>::ones((3, 3));
        penalty[[0, 1]] = 2.0_f64.exp();
        let plain = ScoreBuilder::new(ScoreFamily::Gaussian, &data).build().unwrap();
        let penalized = ScoreBuilder::new(ScoreFamily::Gaussian, &data)
            .with_edge_penalty(penalty)
            .build()
            .unwrap();

        let a = ConjugateScore.local_score(1, &[0], &plain).unwrap();
        let b = ConjugateScore.local_score(1, &[0], &penalized).unwrap();

        assert_relative_eq!(a - b, 2.0, epsilon = TOL);
        assert_eq!(
            ConjugateScore.local_score(1, &[], &plain),
            ConjugateScore.local_score(1, &[], &penalized)
        );
    }

    #[test]
    // Purpose
    // -------
    // Invalid requests are rejected with specific errors.
    //
    // Given
    // -----
    // - A Gaussian object with background `[2]`, a user-defined object and
    //   a dynamic object.
    //
    // Expect
    // ------
    // - Out-of-range node/parent, self-parent, duplicate parent, background
    //   node with parents, user-defined and dynamic rejections.
    fn local_score_rejects_invalid_requests() {
        let data = ScoreData::new(Array2::from_shape_fn((10, 4), |(i, j)| ((i * j + i) % 6) as f64));
        let params = ScoreBuilder::new(ScoreFamily::Gaussian, &data)
            .with_background(vec![2])
            .build()
            .unwrap();
        let usr = ScoreBuilder::new(ScoreFamily::UserDefined, &data).build().unwrap();
        let dynamic = ScoreBuilder::new(ScoreFamily::Gaussian, &data)
            .with_dynamic(DynamicOptions::default())
            .build()
            .unwrap();

        assert_eq!(
            ConjugateScore.local_score(4, &[], &params),
            Err(ScoreError::NodeOutOfRange { node: 4, n: 4 })
        );
        assert_eq!(
            ConjugateScore.local_score(0, &[7], &params),
            Err(ScoreError::NodeOutOfRange { node: 7, n: 4 })
        );
        assert!(matches!(
            ConjugateScore.local_score(0, &[0], &params),
            Err(ScoreError::InvalidParentSet { node: 0, .. })
        ));
        assert!(matches!(
            ConjugateScore.local_score(0, &[1, 1], &params),
            Err(ScoreError::InvalidParentSet { node: 0, .. })
        ));
        assert!(matches!(
            ConjugateScore.local_score(2, &[0], &params),
            Err(ScoreError::InvalidParentSet { node: 2, .. })
        ));
        assert!(ConjugateScore.local_score(2, &[], &params).is_ok());
        assert_eq!(ConjugateScore.local_score(0, &[], &usr), Err(ScoreError::UserDefinedScore));
        assert_eq!(
            ConjugateScore.local_score(0, &[], &dynamic),
            Err(ScoreError::DynamicRequiresSlice)
        );
    }
}
