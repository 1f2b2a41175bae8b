//! Score builder — validation, dispatch and assembly of [`ScoreParameters`].
//!
//! Purpose
//! -------
//! Turn a design matrix plus configuration into a fully computed, immutable
//! [`ScoreParameters`] object. The builder validates every input eagerly,
//! resolves node labels and background nodes, log-transforms the optional
//! edge-penalty matrix, and dispatches to exactly one family computer. For
//! dynamic networks it hands over to the layering engine
//! ([`crate::score::dynamic`]), which calls back into the builder in static
//! mode for every sub-problem.
//!
//! Key behaviors
//! -------------
//! - Static mode rejects missing values; dynamic mode drops incomplete rows
//!   per sub-problem and records how many were removed.
//! - No partially built object is ever returned: any failure aborts the
//!   whole build with a [`ScoreError`](crate::score::errors::ScoreError).
//! - Builds are deterministic; identical inputs give bit-identical objects.
use crate::score::{
    core::{
        data::ScoreData,
        labels::resolve_static_labels,
        options::{DynamicOptions, FamilyParams, ScoreFamily},
        penalty::log_edge_penalty,
        validation::{split_nodes, validate_complete, validate_non_empty, validate_weights},
    },
    dynamic::build_dynamic,
    errors::ScoreResult,
    families::{bde::compute_bde, bdecat::compute_bdecat, bge::compute_bge},
    params::{FamilyStats, ParamsBody, ScoreParameters, UserStats},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// `ScoreBuilder` — inputs of one score-parameter construction.
///
/// Fields
/// ------
/// - `family`: score family to compute.
/// - `data`: design matrix (wide, slice-blocked layout in dynamic mode).
/// - `family_params`: hyperparameters of every family.
/// - `dynamic`: dynamic layout; `None` builds a static object.
/// - `weights`: optional positive per-row weights.
/// - `background`: optional background node indices (static mode only).
/// - `edge_penalty`: optional strictly positive penalty matrix.
/// - `labels`: optional node labels.
#[derive(Debug, Clone)]
pub struct ScoreBuilder<'a> {
    pub(crate) family: ScoreFamily,
    pub(crate) data: &'a ScoreData,
    pub(crate) family_params: FamilyParams,
    pub(crate) dynamic: Option<DynamicOptions>,
    pub(crate) weights: Option<Array1<f64>>,
    pub(crate) background: Option<Vec<usize>>,
    pub(crate) edge_penalty: Option<Array2<f64>>,
    pub(crate) labels: Option<Vec<String>>,
}

impl<'a> ScoreBuilder<'a> {
    /// Start a static build with default hyperparameters.
    pub fn new(family: ScoreFamily, data: &'a ScoreData) -> ScoreBuilder<'a> {
        ScoreBuilder {
            family,
            data,
            family_params: FamilyParams::default(),
            dynamic: None,
            weights: None,
            background: None,
            edge_penalty: None,
            labels: None,
        }
    }

    /// Start a build from a family tag (`bge`, `bde`, `bdecat`, `usr`).
    ///
    /// Errors
    /// ------
    /// - `ScoreError::InvalidScoreFamily` for any other tag.
    pub fn from_tag(tag: &str, data: &'a ScoreData) -> ScoreResult<ScoreBuilder<'a>> {
        Ok(ScoreBuilder::new(tag.parse()?, data))
    }

    pub fn with_family_params(mut self, family_params: FamilyParams) -> Self {
        self.family_params = family_params;
        self
    }

    /// Switch to a dynamic build with the given layout.
    pub fn with_dynamic(mut self, dynamic: DynamicOptions) -> Self {
        self.dynamic = Some(dynamic);
        self
    }

    pub fn with_weights(mut self, weights: Array1<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_background(mut self, background: Vec<usize>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_edge_penalty(mut self, edge_penalty: Array2<f64>) -> Self {
        self.edge_penalty = Some(edge_penalty);
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Validate the inputs and compute the parameter object.
    ///
    /// Returns
    /// -------
    /// `ScoreResult<ScoreParameters>`
    ///   The fully computed object, or the first validation failure.
    ///
    /// Errors
    /// ------
    /// - Any construction variant of
    ///   [`ScoreError`](crate::score::errors::ScoreError): empty or
    ///   incomplete static data, dimension mismatches, bad weights, bad
    ///   background indices or labels, non-positive hyperparameters or
    ///   penalties, non-binary values (BDe), malformed levels (BDeCat).
    pub fn build(&self) -> ScoreResult<ScoreParameters> {
        tracing::debug!(
            family = %self.family,
            rows = self.data.nrows(),
            cols = self.data.ncols(),
            dynamic = self.dynamic.is_some(),
            "building score parameters"
        );
        match &self.dynamic {
            Some(opts) => build_dynamic(self, opts),
            None => self.build_static(),
        }
    }

    pub(crate) fn build_static(&self) -> ScoreResult<ScoreParameters> {
        let values = self.data.values.view();
        validate_non_empty(values)?;
        validate_complete(values)?;
        let n = values.ncols();
        validate_weights(self.weights.as_ref(), values.nrows())?;

        let (background, main) = split_nodes(self.background.as_deref().unwrap_or(&[]), n)?;
        let labels = resolve_static_labels(self.labels.as_deref(), self.data, n)?;
        let log_edge_penalty =
            self.edge_penalty.as_ref().map(|p| log_edge_penalty(p.view(), n)).transpose()?;

        let weights = self.weights.as_ref().map(|w| w.view());
        let stats = compute_stats(self.family, values, weights, &self.family_params)?;

        Ok(ScoreParameters {
            family: self.family,
            n,
            bgn: background.len(),
            nsmall: main.len(),
            labels,
            background,
            main,
            weights: self.weights.clone(),
            data: values.to_owned(),
            log_edge_penalty,
            body: ParamsBody::Static(stats),
        })
    }
}

/// Dispatch to the family computer.
fn compute_stats(
    family: ScoreFamily, data: ArrayView2<f64>, weights: Option<ArrayView1<f64>>,
    params: &FamilyParams,
) -> ScoreResult<FamilyStats> {
    match family {
        ScoreFamily::Gaussian => {
            let hyper = params.bge.resolve(data.ncols())?;
            Ok(FamilyStats::Gaussian(compute_bge(data, weights, hyper)))
        }
        ScoreFamily::Binary => Ok(FamilyStats::Binary(compute_bde(data, weights, &params.bde)?)),
        ScoreFamily::Categorical => {
            Ok(FamilyStats::Categorical(compute_bdecat(data, &params.bdecat)?))
        }
        ScoreFamily::UserDefined => {
            Ok(FamilyStats::UserDefined(UserStats { pc_test: params.usr.resolve()?.pc_test }))
        }
    }
}
