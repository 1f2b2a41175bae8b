//! rust_bnscore — Bayesian-network score parameters with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes score-parameter construction to Python via the `_rust_bnscore`
//! extension module. The numerical work lives in [`score`]; this file only
//! converts inputs, maps errors and registers Python classes.
//!
//! Key behaviors
//! -------------
//! - Re-export the [`score`] module as the public crate surface.
//! - Define the `ScoreParams` `#[pyclass]` wrapper and the `#[pymodule]`
//!   initializer when the `python-bindings` feature is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Python-visible constructors accept the same options as
//!   [`ScoreBuilder`](score::ScoreBuilder); family-specific defaults apply
//!   when an option is left as `None`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary with their `Display` message preserved.
//!
//! Conventions
//! -----------
//! - Indices passed from Python are 0-based, as in Rust.
//! - Missing values are `NaN` (`numpy.nan`, pandas `NA` after `to_numpy`).
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends on [`score`] directly and can ignore the
//!   items guarded by the `python-bindings` feature.

pub mod score;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    score::{
        BdeCatOptions, BdeOptions, BgeOptions, ConjugateScore, DynamicOptions, FamilyParams,
        LocalScore, ScoreBuilder, ScoreData, ScoreParameters, UserOptions,
    },
    utils::{extract_column_names, extract_f64_matrix, extract_f64_vector},
};

/// ScoreParams — Python-facing wrapper for [`ScoreParameters`].
///
/// Constructed from Python via
/// `ScoreParams(data, scoretype="bge", ...)`; see the `#[new]` signature for
/// every keyword. Dynamic objects expose their slice children through
/// `first_slice()` and `transition(t)`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_bnscore.score", frozen)]
pub struct ScoreParams {
    inner: ScoreParameters,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ScoreParams {
    #[new]
    #[pyo3(
        signature = (
            data,
            scoretype = "bge",
            am = 1.0,
            aw = None,
            chi = 0.5,
            edgepf = None,
            levels = None,
            pctesttype = "bge",
            weightvector = None,
            bgnodes = None,
            edgepmat = None,
            nodeslabels = None,
            dbn = false,
            slices = 2,
            bgn = 0,
            stationary = true,
            samestruct = true,
        ),
        text_signature = "(data, /, scoretype='bge', am=1.0, aw=None, chi=0.5, edgepf=None, \
                          levels=None, pctesttype='bge', weightvector=None, bgnodes=None, \
                          edgepmat=None, nodeslabels=None, dbn=False, slices=2, bgn=0, \
                          stationary=True, samestruct=True)"
    )]
    pub fn new<'py>(
        data: &Bound<'py, PyAny>, scoretype: &str, am: f64, aw: Option<f64>, chi: f64,
        edgepf: Option<f64>, levels: Option<Vec<usize>>, pctesttype: &str,
        weightvector: Option<&Bound<'py, PyAny>>, bgnodes: Option<Vec<usize>>,
        edgepmat: Option<&Bound<'py, PyAny>>, nodeslabels: Option<Vec<String>>, dbn: bool,
        slices: usize, bgn: usize, stationary: bool, samestruct: bool,
    ) -> PyResult<Self> {
        let values = extract_f64_matrix(data)?;
        let data = match extract_column_names(data) {
            Some(names) if names.len() == values.ncols() => {
                ScoreData::with_column_names(values, names)?
            }
            _ => ScoreData::new(values),
        };

        let defaults = FamilyParams::default();
        let family_params = FamilyParams {
            bge: BgeOptions::new(am, aw, edgepf.unwrap_or(defaults.bge.edgepf)),
            bde: BdeOptions::new(chi, edgepf.unwrap_or(defaults.bde.edgepf)),
            bdecat: BdeCatOptions::new(chi, edgepf.unwrap_or(defaults.bdecat.edgepf), levels),
            usr: UserOptions { pc_test: pctesttype.parse()? },
        };

        let mut builder = ScoreBuilder::from_tag(scoretype, &data)?.with_family_params(family_params);
        if let Some(w) = weightvector {
            builder = builder.with_weights(extract_f64_vector(w)?);
        }
        if let Some(bg) = bgnodes {
            builder = builder.with_background(bg);
        }
        if let Some(p) = edgepmat {
            builder = builder.with_edge_penalty(extract_f64_matrix(p)?);
        }
        if let Some(labels) = nodeslabels {
            builder = builder.with_labels(labels);
        }
        if dbn {
            let mut opts = DynamicOptions::new(slices, bgn, stationary);
            opts.same_structure = samestruct;
            builder = builder.with_dynamic(opts);
        }
        Ok(ScoreParams { inner: builder.build()? })
    }

    /// Score family tag (`bge`, `bde`, `bdecat`, `usr`).
    #[getter]
    pub fn scoretype(&self) -> &'static str {
        self.inner.family().tag()
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.node_count()
    }

    #[getter]
    pub fn bgn(&self) -> usize {
        self.inner.background_count()
    }

    #[getter]
    pub fn nsmall(&self) -> usize {
        self.inner.main_count()
    }

    #[getter]
    pub fn labels(&self) -> Vec<String> {
        self.inner.labels().to_vec()
    }

    #[getter]
    pub fn bgnodes(&self) -> Vec<usize> {
        self.inner.background_nodes().to_vec()
    }

    #[getter]
    pub fn dbn(&self) -> bool {
        self.inner.is_dynamic()
    }

    /// Score-constant table indexed by parent count (static objects only).
    #[getter]
    pub fn scoreconstvec(&self) -> Option<Vec<f64>> {
        self.inner.score_consts().map(|c| c.to_vec())
    }

    /// Rows removed for missing values (dynamic objects only).
    #[getter]
    pub fn removed_rows(&self) -> Option<usize> {
        self.inner.dynamic().map(|d| d.removed_rows)
    }

    /// Initial-slice child of a dynamic object.
    pub fn first_slice(&self) -> PyResult<ScoreParams> {
        self.inner
            .dynamic()
            .map(|d| ScoreParams { inner: d.first_slice().clone() })
            .ok_or_else(|| PyValueError::new_err("first_slice requires a dynamic object"))
    }

    /// Transition child for slice pair `(t-1, t)`, `1 <= t < slices`.
    pub fn transition(&self, t: usize) -> PyResult<ScoreParams> {
        self.inner
            .dynamic()
            .and_then(|d| d.transition(t))
            .map(|p| ScoreParams { inner: p.clone() })
            .ok_or_else(|| PyValueError::new_err("transition requires a dynamic object and 1 <= t < slices"))
    }

    /// Closed-form local score of `node` given `parents`.
    pub fn local_score(&self, node: usize, parents: Vec<usize>) -> PyResult<f64> {
        Ok(ConjugateScore.local_score(node, &parents, &self.inner)?)
    }
}

/// _rust_bnscore — PyO3 module initializer for the Python extension.
///
/// Registers `ScoreParams` under a `score` submodule and in `sys.modules` so
/// that `import rust_bnscore.score` works from Python.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_bnscore<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let score_mod = PyModule::new(_py, "score")?;
    score_mod.add_class::<ScoreParams>()?;
    m.add_submodule(&score_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_bnscore.score", score_mod)?;
    Ok(())
}
