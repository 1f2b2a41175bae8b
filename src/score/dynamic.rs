//! Dynamic layering — split a time-sliced design into static sub-problems.
//!
//! Purpose
//! -------
//! A dynamic Bayesian network is scored as an initial-slice network plus
//! one or more two-slice transition networks. This module reorders the wide
//! data set into those static designs, drops incomplete rows per design,
//! builds each child through the static builder, and assembles the
//! top-level [`ScoreParameters`] with its [`DynamicIndexMaps`].
//!
//! Key behaviors
//! -------------
//! - Raw layout: `[background (bgn), slice 0 (nsmall), …, slice T−1 (nsmall)]`.
//! - Initial slice: columns `[slice 0 main, background]`, background nodes
//!   `nsmall..nsmall+bgn`, every penalty factor forced to `1`.
//! - Transition `(t, t+1)`: columns `[slice t+1 main, background, slice t
//!   main]`, background nodes `nsmall..2·nsmall+bgn`.
//! - Stationary networks stack every slice pair into one transition design
//!   (weights repeated per pair); non-stationary networks keep one child per
//!   pair.
//! - Missing values are removed per child; `removed_rows` is their total.
//!
//! Invariants & assumptions
//! ------------------------
//! - `slices ≥ 2`, `nsmall ≥ 1` and `ncols = bgn + nsmall·slices`.
//! - Children are always static; recursion depth is one.
//! - Categorical level counts are resolved once per base variable across all
//!   slices, so every child sees the same counts.
use crate::score::{
    builder::ScoreBuilder,
    core::{
        data::{ScoreData, filter_missing, select_columns, stack_rows},
        index_map::{
            DynamicIndexMaps, first_slice_background, first_slice_order, transition_background,
            transition_order,
        },
        labels::SliceLabels,
        options::{DynamicOptions, FamilyParams, ScoreFamily},
        penalty::{check_penalty, permute_square},
        validation::{
            observed_levels, validate_binary, validate_explicit_levels, validate_non_empty,
            validate_weights,
        },
    },
    errors::{ScoreError, ScoreResult},
    params::{DynamicParams, ParamsBody, ScoreParameters, SliceParams},
};
use ndarray::{Array1, Array2, ArrayView2};

/// Wide-design geometry.
#[derive(Debug, Clone, Copy)]
struct Layout {
    nsmall: usize,
    bgn: usize,
    slices: usize,
}

impl Layout {
    fn from_options(cols: usize, opts: &DynamicOptions) -> ScoreResult<Layout> {
        if opts.slices < 2 {
            return Err(ScoreError::InvalidSlices(opts.slices));
        }
        let bgn = opts.static_count;
        if bgn >= cols {
            return Err(ScoreError::InvalidStaticCount { static_count: bgn, cols });
        }
        let nsmall = (cols - bgn) / opts.slices;
        if nsmall == 0 {
            return Err(ScoreError::InvalidStaticCount { static_count: bgn, cols });
        }
        let expected = bgn + nsmall * opts.slices;
        if expected != cols {
            return Err(ScoreError::ColumnCountMismatch { expected, found: cols });
        }
        Ok(Layout { nsmall, bgn, slices: opts.slices })
    }

    /// Base variable (raw order `[background, main]`) of a wide column.
    fn base_of(&self, col: usize) -> usize {
        if col < self.bgn { col } else { self.bgn + (col - self.bgn) % self.nsmall }
    }
}

/// One static child: its design, weights and configuration.
struct SubProblem {
    matrix: Array2<f64>,
    weights: Option<Array1<f64>>,
    family_params: FamilyParams,
    background: Vec<usize>,
    edge_penalty: Option<Array2<f64>>,
    labels: Vec<String>,
}

impl SubProblem {
    /// Drop incomplete rows and run the static builder.
    fn build(self, family: ScoreFamily) -> ScoreResult<(ScoreParameters, usize)> {
        let filtered = filter_missing(self.matrix.view(), self.weights.as_ref().map(|w| w.view()));
        let data = ScoreData::new(filtered.matrix);
        let child = ScoreBuilder {
            family,
            data: &data,
            family_params: self.family_params,
            dynamic: None,
            weights: filtered.weights,
            background: Some(self.background),
            edge_penalty: self.edge_penalty,
            labels: Some(self.labels),
        };
        Ok((child.build_static()?, filtered.removed))
    }
}

/// Build the parameter object of a dynamic network.
///
/// Errors
/// ------
/// - `ScoreError::BackgroundInDynamic` when a background list is supplied.
/// - `ScoreError::InvalidSlices`, `InvalidStaticCount`,
///   `ColumnCountMismatch` for a layout that does not fit the data.
/// - Any error of the static builder raised by a child.
pub(crate) fn build_dynamic(
    builder: &ScoreBuilder<'_>, opts: &DynamicOptions,
) -> ScoreResult<ScoreParameters> {
    if builder.background.is_some() {
        return Err(ScoreError::BackgroundInDynamic);
    }
    let raw = builder.data.values.view();
    validate_non_empty(raw)?;
    let layout = Layout::from_options(raw.ncols(), opts)?;
    let Layout { nsmall, bgn, slices } = layout;
    let n = nsmall + bgn;
    validate_weights(builder.weights.as_ref(), raw.nrows())?;

    let base_levels = match builder.family {
        ScoreFamily::Binary => {
            validate_binary(raw)?;
            None
        }
        ScoreFamily::Categorical => {
            Some(resolve_base_levels(raw, builder.family_params.bdecat.levels.as_deref(), layout)?)
        }
        _ => None,
    };

    let penalty = builder.edge_penalty.as_ref();
    if let Some(p) = penalty {
        check_penalty(p.view(), 2 * nsmall + bgn)?;
    }
    let labels = SliceLabels::resolve(builder.labels.as_deref(), builder.data, nsmall, bgn, slices)?;

    // Initial slice: [main, background].
    let first_levels = base_levels.as_ref().map(|levels| {
        levels[bgn..].iter().chain(&levels[..bgn]).copied().collect::<Vec<_>>()
    });
    let first = SubProblem {
        matrix: select_columns(raw, &first_slice_order(nsmall, bgn)),
        weights: builder.weights.clone(),
        family_params: builder.family_params.without_edge_penalty().with_levels(first_levels),
        background: first_slice_background(nsmall, bgn),
        edge_penalty: penalty.map(|p| {
            let order: Vec<usize> = (bgn + nsmall..bgn + 2 * nsmall).chain(0..bgn).collect();
            permute_square(p.view(), &order)
        }),
        labels: labels.first_slice(),
    };

    // Transitions: [future main, background, past main].
    let transition_levels = base_levels.as_ref().map(|levels| {
        levels[bgn..].iter().chain(&levels[..bgn]).chain(&levels[bgn..]).copied().collect::<Vec<_>>()
    });
    let transition_params = match transition_levels {
        Some(levels) => builder.family_params.with_levels(Some(levels)),
        None => builder.family_params.clone(),
    };
    let transition_penalty =
        penalty.map(|p| permute_square(p.view(), &transition_order(nsmall, bgn, 0)));
    let transition_problem = |matrix: Array2<f64>, weights: Option<Array1<f64>>, t: usize| SubProblem {
        matrix,
        weights,
        family_params: transition_params.clone(),
        background: transition_background(nsmall, bgn),
        edge_penalty: transition_penalty.clone(),
        labels: labels.transition(t),
    };
    let pair = |t: usize| select_columns(raw, &transition_order(nsmall, bgn, t * nsmall));

    let (first, mut removed_rows) = first.build(builder.family)?;
    tracing::debug!(slice = 0, removed = removed_rows, "built initial-slice parameters");

    let children = if opts.stationary {
        let blocks: Vec<Array2<f64>> = (0..slices - 1).map(pair).collect();
        let stacked = stack_rows(&blocks)?;
        let weights = builder.weights.as_ref().map(|w| {
            Array1::from_iter((0..slices - 1).flat_map(|_| w.iter().copied()))
        });
        let (transition, removed) = transition_problem(stacked, weights, 0).build(builder.family)?;
        tracing::debug!(pairs = slices - 1, removed, "built stationary transition parameters");
        removed_rows += removed;
        SliceParams::Stationary { first, transition }
    } else {
        let mut all = Vec::with_capacity(slices);
        all.push(first);
        for t in 0..slices - 1 {
            let (child, removed) =
                transition_problem(pair(t), builder.weights.clone(), t).build(builder.family)?;
            tracing::debug!(slice = t + 1, removed, "built transition parameters");
            removed_rows += removed;
            all.push(child);
        }
        SliceParams::PerSlice(all)
    };

    if removed_rows > 0 {
        tracing::info!(removed_rows, "rows with missing values were removed");
    }

    let log_edge_penalty = penalty.map(|p| p.mapv(f64::ln));
    Ok(ScoreParameters {
        family: builder.family,
        n,
        bgn,
        nsmall,
        labels: labels.first_slice(),
        background: (nsmall..n).collect(),
        main: (0..nsmall).collect(),
        weights: builder.weights.clone(),
        data: raw.to_owned(),
        log_edge_penalty,
        body: ParamsBody::Dynamic(Box::new(DynamicParams {
            slices,
            stationary: opts.stationary,
            same_structure: opts.same_structure,
            removed_rows,
            children,
            maps: DynamicIndexMaps::new(nsmall, bgn),
        })),
    })
}

/// Level counts per base variable, in raw order `[background, main]`.
///
/// Explicit levels (length `bgn + nsmall`) are checked against every slice.
/// Otherwise each base variable gets `max + 1` over all its slice columns;
/// a variable that is never observed gets one level.
fn resolve_base_levels(
    raw: ArrayView2<f64>, explicit: Option<&[usize]>, layout: Layout,
) -> ScoreResult<Vec<usize>> {
    let n = layout.nsmall + layout.bgn;
    if let Some(levels) = explicit {
        if levels.len() != n {
            return Err(ScoreError::LevelCountMismatch { expected: n, found: levels.len() });
        }
        let wide: Vec<usize> = (0..raw.ncols()).map(|c| levels[layout.base_of(c)]).collect();
        validate_explicit_levels(raw, &wide)?;
        return Ok(levels.to_vec());
    }
    let mut base = vec![1usize; n];
    for (col, observed) in observed_levels(raw)?.into_iter().enumerate() {
        if let Some(levels) = observed {
            let b = layout.base_of(col);
            base[b] = base[b].max(levels);
        }
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{
        core::{index_map::IndexBlock, options::BdeCatOptions},
        params::FamilyStats,
    };
    use ndarray::{Array2, array, s};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The four combinations of {no background, background} ×
    //   {stationary, non-stationary}.
    // - Row accounting when missing values are dropped.
    // - Layout and argument errors specific to dynamic builds.
    // - Categorical level resolution across slices and penalty permutation.
    //
    // They intentionally DO NOT cover:
    // - Family statistics themselves (see `score::families`).
    // -------------------------------------------------------------------------

    fn wide(rows: usize, cols: usize) -> ScoreData {
        ScoreData::new(Array2::from_shape_fn((rows, cols), |(i, j)| {
            ((i * 5 + j * 7) % 13) as f64 / 2.0 + (i % 3) as f64 * 0.1 * j as f64
        }))
    }

    fn build(data: &ScoreData, opts: DynamicOptions) -> ScoreResult<ScoreParameters> {
        ScoreBuilder::new(ScoreFamily::Gaussian, data).with_dynamic(opts).build()
    }

    #[test]
    // Purpose
    // -------
    // Stationary build without background nodes.
    //
    // Given
    // -----
    // - 12 rows, nsmall = 2, slices = 3 (6 columns), bgn = 0.
    //
    // Expect
    // ------
    // - n = 2; first slice is columns 0..2 with pf = 1; the transition
    //   design stacks pairs (0,1) and (1,2) into 24 rows; its first pair
    //   rows equal columns `[2, 3, 0, 1]`.
    fn stationary_without_background() {
        let data = wide(12, 6);

        let params = build(&data, DynamicOptions::new(3, 0, true)).unwrap();

        let dynamic = params.dynamic().unwrap();
        assert_eq!(params.node_count(), 2);
        assert_eq!(params.main_nodes(), &[0, 1]);
        assert!(params.background_nodes().is_empty());
        assert_eq!(dynamic.removed_rows, 0);

        let first = dynamic.first_slice();
        assert_eq!(first.design_matrix(), &data.values.slice(s![.., 0..2]).to_owned());
        match first.stats() {
            Some(FamilyStats::Gaussian(s)) => assert_eq!(s.edgepf, 1.0),
            other => panic!("expected Gaussian stats, got {other:?}"),
        }

        let transition = dynamic.transition(1).unwrap();
        assert_eq!(transition.design_matrix().dim(), (24, 4));
        assert_eq!(transition.background_nodes(), &[2, 3]);
        assert_eq!(
            transition.design_matrix().slice(s![0..12, ..]),
            select_columns(data.values.view(), &[2, 3, 0, 1])
        );
        assert_eq!(dynamic.transition(2), Some(transition));
        assert_eq!(dynamic.transition(3), None);
    }

    #[test]
    // Purpose
    // -------
    // Stationary build with background nodes.
    //
    // Given
    // -----
    // - 10 rows, bgn = 1, nsmall = 2, slices = 2 (5 columns).
    //
    // Expect
    // ------
    // - n = 3, background `[2]`; first slice columns `[1, 2, 0]` with
    //   background `[2]`; transition columns `[3, 4, 0, 1, 2]`; maps match
    //   `DynamicIndexMaps::new(2, 1)`.
    fn stationary_with_background() {
        let data = wide(10, 5);

        let params = build(&data, DynamicOptions::new(2, 1, true)).unwrap();

        let dynamic = params.dynamic().unwrap();
        assert_eq!(params.node_count(), 3);
        assert_eq!(params.background_nodes(), &[2]);
        assert_eq!(params.labels(), &["v1.1", "v2.1", "s1"]);
        assert_eq!(dynamic.first_slice().background_nodes(), &[2]);
        assert_eq!(
            dynamic.first_slice().design_matrix(),
            &select_columns(data.values.view(), &[1, 2, 0])
        );
        assert_eq!(
            dynamic.transition(1).unwrap().design_matrix(),
            &select_columns(data.values.view(), &[3, 4, 0, 1, 2])
        );
        assert_eq!(dynamic.maps.transition, IndexBlock { rows: vec![3..5], cols: 0..2 });
    }

    #[test]
    // Purpose
    // -------
    // Non-stationary build without background keeps one child per pair.
    //
    // Given
    // -----
    // - 8 rows, nsmall = 2, slices = 3, bgn = 0.
    //
    // Expect
    // ------
    // - Three children; child 2 holds pair (1,2) as columns `[4, 5, 2, 3]`
    //   with 8 rows and labels `[v1.3, v2.3, v1.2, v2.2]`.
    fn non_stationary_without_background() {
        let data = wide(8, 6);

        let params = build(&data, DynamicOptions::new(3, 0, false)).unwrap();

        let dynamic = params.dynamic().unwrap();
        let SliceParams::PerSlice(all) = &dynamic.children else {
            panic!("expected per-slice children");
        };
        assert_eq!(all.len(), 3);
        let second = dynamic.transition(2).unwrap();
        assert_eq!(second.design_matrix(), &select_columns(data.values.view(), &[4, 5, 2, 3]));
        assert_eq!(second.labels(), &["v1.3", "v2.3", "v1.2", "v2.2"]);
    }

    #[test]
    // Purpose
    // -------
    // Non-stationary build with background nodes and missing values.
    //
    // Given
    // -----
    // - 8 rows, bgn = 1, nsmall = 1, slices = 3; NaN at (2, 3) (slice 2).
    //
    // Expect
    // ------
    // - Initial slice keeps 8 rows, pair (0,1) keeps 8, pair (1,2) keeps 7;
    //   removed_rows = 1.
    fn non_stationary_with_background_drops_missing_rows() {
        let mut data = wide(8, 4);
        data.values[[2, 3]] = f64::NAN;

        let params = build(&data, DynamicOptions::new(3, 1, false)).unwrap();

        let dynamic = params.dynamic().unwrap();
        assert_eq!(dynamic.first_slice().design_matrix().nrows(), 8);
        assert_eq!(dynamic.transition(1).unwrap().design_matrix().nrows(), 8);
        assert_eq!(dynamic.transition(2).unwrap().design_matrix().nrows(), 7);
        assert_eq!(dynamic.removed_rows, 1);
        assert_eq!(params.background_nodes(), &[1]);
    }

    #[test]
    // Purpose
    // -------
    // Layout errors and the background-list restriction.
    //
    // Given
    // -----
    // - 7 columns with slices = 2; slices = 1; static_count = 7; a
    //   background list.
    //
    // Expect
    // ------
    // - `ColumnCountMismatch`, `InvalidSlices(1)`, `InvalidStaticCount`,
    //   `BackgroundInDynamic`.
    fn dynamic_layout_errors() {
        let data = wide(4, 7);

        assert_eq!(
            build(&data, DynamicOptions::new(2, 0, true)),
            Err(ScoreError::ColumnCountMismatch { expected: 6, found: 7 })
        );
        assert_eq!(build(&data, DynamicOptions::new(1, 0, true)), Err(ScoreError::InvalidSlices(1)));
        assert_eq!(
            build(&data, DynamicOptions::new(2, 7, true)),
            Err(ScoreError::InvalidStaticCount { static_count: 7, cols: 7 })
        );
        assert_eq!(
            ScoreBuilder::new(ScoreFamily::Gaussian, &data)
                .with_dynamic(DynamicOptions::default())
                .with_background(vec![0])
                .build(),
            Err(ScoreError::BackgroundInDynamic)
        );
    }

    #[test]
    // Purpose
    // -------
    // Categorical levels are shared across slices.
    //
    // Given
    // -----
    // - One variable over two slices; slice 0 sees {0, 1}, slice 1 sees
    //   {0, 1, 2}.
    //
    // Expect
    // ------
    // - First slice levels `[3]`, transition levels `[3, 3]`.
    fn categorical_levels_resolved_across_slices() {
        let data = ScoreData::new(array![[0.0, 2.0], [1.0, 0.0], [0.0, 1.0]]);
        let fp = FamilyParams { bdecat: BdeCatOptions::default(), ..Default::default() };

        let params = ScoreBuilder::new(ScoreFamily::Categorical, &data)
            .with_family_params(fp)
            .with_dynamic(DynamicOptions::default())
            .build()
            .unwrap();

        let dynamic = params.dynamic().unwrap();
        let levels = |p: &ScoreParameters| match p.stats() {
            Some(FamilyStats::Categorical(s)) => s.levels.clone(),
            other => panic!("expected Categorical stats, got {other:?}"),
        };
        assert_eq!(levels(dynamic.first_slice()), vec![3]);
        assert_eq!(levels(dynamic.transition(1).unwrap()), vec![3, 3]);
    }

    #[test]
    // Purpose
    // -------
    // The user-order penalty is permuted for children and kept in log space
    // at the top level.
    //
    // Given
    // -----
    // - bgn = 1, nsmall = 1, slices = 2; penalty `P[i][j] = 1 + 3i + j`
    //   over user order `[s, x.1, x.2]`.
    //
    // Expect
    // ------
    // - Transition (internal `[x.2, s, x.1]`) entry (2, 0) = ln P[1][2] = ln 6.
    // - First slice (`[x, s]`) entry (1, 0) = ln P[0][2] = ln 3.
    fn edge_penalty_is_permuted_per_child() {
        let data = wide(6, 3);
        let penalty = Array2::from_shape_fn((3, 3), |(i, j)| 1.0 + 3.0 * i as f64 + j as f64);

        let params = ScoreBuilder::new(ScoreFamily::Gaussian, &data)
            .with_dynamic(DynamicOptions::new(2, 1, true))
            .with_edge_penalty(penalty)
            .build()
            .unwrap();

        let dynamic = params.dynamic().unwrap();
        let transition = dynamic.transition(1).unwrap().log_edge_penalty().unwrap();
        let first = dynamic.first_slice().log_edge_penalty().unwrap();
        assert_eq!(transition[[2, 0]], 6.0_f64.ln());
        assert_eq!(first[[1, 0]], 3.0_f64.ln());
        assert_eq!(params.log_edge_penalty().unwrap()[[0, 0]], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The same-structure flag is recorded but leaves construction unchanged.
    //
    // Given
    // -----
    // - 24 rows, nsmall = 2, bgn = 1, slices = 3, stationary, built with
    //   `same_structure` true and false.
    //
    // Expect
    // ------
    // - The flag is stored as given; children, maps and row counts match.
    fn same_structure_flag_is_recorded_only() {
        let data = wide(24, 7);
        let mut off = DynamicOptions::new(3, 1, true);
        off.same_structure = false;

        let with = build(&data, DynamicOptions::new(3, 1, true)).unwrap();
        let without = build(&data, off).unwrap();
        let (a, b) = (with.dynamic().unwrap(), without.dynamic().unwrap());

        assert!(a.same_structure);
        assert!(!b.same_structure);
        assert_eq!(a.children, b.children);
        assert_eq!(a.maps, b.maps);
        assert_eq!(a.removed_rows, b.removed_rows);
    }
}
