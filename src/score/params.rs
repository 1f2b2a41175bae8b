//! Score parameters — the immutable result of the builder.
//!
//! Purpose
//! -------
//! Define [`ScoreParameters`], the object every local-score evaluation reads
//! from, together with its family payload ([`FamilyStats`]) and, for dynamic
//! networks, the tree of per-slice children ([`DynamicParams`]).
//!
//! Key behaviors
//! -------------
//! - Fields are computed once by [`ScoreBuilder`](crate::score::builder::ScoreBuilder)
//!   and exposed through read-only accessors; there is no update path.
//! - The family payload is a tagged union resolved at construction, so
//!   scorers pattern-match instead of probing optional fields.
//! - Dynamic objects own their children by value; children are always static.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n = nsmall + bgn`; `background` and `main` partition `0..n`.
//! - Static objects: `data` is complete, `labels.len() == data.ncols() == n`.
//! - Dynamic objects: `data` is the raw wide design (it may contain `NaN`),
//!   `main = 0..nsmall`, `background = nsmall..n`, and `labels` are those of
//!   the initial-slice child.
//! - `log_edge_penalty`, when present, is `n×n` (static) or
//!   `(2·nsmall + bgn)²` in user order (dynamic).
use crate::score::{
    core::{index_map::DynamicIndexMaps, options::ScoreFamily},
    families::{bde::BdeStats, bdecat::BdeCatStats, bge::BgeStats},
};
use ndarray::{Array1, Array2};

/// Settings recorded for a user-defined family.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub pc_test: ScoreFamily,
}

/// Family-specific precomputed statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilyStats {
    Gaussian(BgeStats),
    Binary(BdeStats),
    Categorical(BdeCatStats),
    UserDefined(UserStats),
}

impl FamilyStats {
    pub fn family(&self) -> ScoreFamily {
        match self {
            FamilyStats::Gaussian(_) => ScoreFamily::Gaussian,
            FamilyStats::Binary(_) => ScoreFamily::Binary,
            FamilyStats::Categorical(_) => ScoreFamily::Categorical,
            FamilyStats::UserDefined(_) => ScoreFamily::UserDefined,
        }
    }

    /// Score-constant table indexed by parent count, if the family has one.
    pub fn score_consts(&self) -> Option<&Array1<f64>> {
        match self {
            FamilyStats::Gaussian(s) => Some(&s.score_consts),
            FamilyStats::Binary(s) => Some(&s.score_consts),
            FamilyStats::Categorical(s) => Some(&s.score_consts),
            FamilyStats::UserDefined(_) => None,
        }
    }
}

/// Static sub-problems of a dynamic network.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceParams {
    /// One initial-slice object and one transition object shared by every
    /// slice pair.
    Stationary { first: ScoreParameters, transition: ScoreParameters },
    /// Entry 0 is the initial slice; entry `t ≥ 1` the transition `(t−1, t)`.
    PerSlice(Vec<ScoreParameters>),
}

/// `DynamicParams` — dynamic-only fields of a parameter object.
///
/// Fields
/// ------
/// - `slices`: number of time slices in the raw data.
/// - `stationary`, `same_structure`: layout flags from the options.
/// - `removed_rows`: rows dropped for missing values, summed over children.
/// - `children`: the static sub-problems.
/// - `maps`: index maps of the compact two-slice adjacency space.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicParams {
    pub slices: usize,
    pub stationary: bool,
    pub same_structure: bool,
    pub removed_rows: usize,
    pub children: SliceParams,
    pub maps: DynamicIndexMaps,
}

impl DynamicParams {
    /// Initial-slice object.
    pub fn first_slice(&self) -> &ScoreParameters {
        match &self.children {
            SliceParams::Stationary { first, .. } => first,
            SliceParams::PerSlice(all) => &all[0],
        }
    }

    /// Transition object for slice pair `(t−1, t)`, `1 ≤ t < slices`.
    pub fn transition(&self, t: usize) -> Option<&ScoreParameters> {
        if t == 0 || t >= self.slices {
            return None;
        }
        match &self.children {
            SliceParams::Stationary { transition, .. } => Some(transition),
            SliceParams::PerSlice(all) => all.get(t),
        }
    }
}

/// Static or dynamic body of a parameter object.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsBody {
    Static(FamilyStats),
    Dynamic(Box<DynamicParams>),
}

/// `ScoreParameters` — sufficient statistics and hyperparameters for scoring
/// parent sets.
///
/// See the module documentation for invariants. Construct through
/// [`ScoreBuilder`](crate::score::builder::ScoreBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreParameters {
    pub(crate) family: ScoreFamily,
    pub(crate) n: usize,
    pub(crate) bgn: usize,
    pub(crate) nsmall: usize,
    pub(crate) labels: Vec<String>,
    pub(crate) background: Vec<usize>,
    pub(crate) main: Vec<usize>,
    pub(crate) weights: Option<Array1<f64>>,
    pub(crate) data: Array2<f64>,
    pub(crate) log_edge_penalty: Option<Array2<f64>>,
    pub(crate) body: ParamsBody,
}

impl ScoreParameters {
    pub fn family(&self) -> ScoreFamily {
        self.family
    }

    /// Number of nodes `n`.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Number of background nodes `bgn`.
    pub fn background_count(&self) -> usize {
        self.bgn
    }

    /// Number of nodes that may receive parents, `n − bgn`.
    pub fn main_count(&self) -> usize {
        self.nsmall
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn background_nodes(&self) -> &[usize] {
        &self.background
    }

    pub fn main_nodes(&self) -> &[usize] {
        &self.main
    }

    pub fn is_background(&self, node: usize) -> bool {
        self.background.binary_search(&node).is_ok()
    }

    /// Per-row weights of `design_matrix`; `None` means unit weights.
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn design_matrix(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn log_edge_penalty(&self) -> Option<&Array2<f64>> {
        self.log_edge_penalty.as_ref()
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.body, ParamsBody::Dynamic(_))
    }

    pub fn body(&self) -> &ParamsBody {
        &self.body
    }

    /// Family payload of a static object.
    pub fn stats(&self) -> Option<&FamilyStats> {
        match &self.body {
            ParamsBody::Static(stats) => Some(stats),
            ParamsBody::Dynamic(_) => None,
        }
    }

    /// Dynamic fields of a dynamic object.
    pub fn dynamic(&self) -> Option<&DynamicParams> {
        match &self.body {
            ParamsBody::Static(_) => None,
            ParamsBody::Dynamic(d) => Some(d),
        }
    }

    /// Score-constant table of a static object.
    pub fn score_consts(&self) -> Option<&Array1<f64>> {
        self.stats().and_then(FamilyStats::score_consts)
    }
}
