//! score — score parameters for Bayesian-network structure learning.
//!
//! Purpose
//! -------
//! Precompute, once per data set, everything a structure-search routine
//! needs to evaluate the local score of any node given any parent set:
//! Normal-Wishart posterior statistics for continuous data (BGe), weighted
//! count tables for binary data (BDe), level counts for categorical data
//! (BDeCat), or the settings of a user-supplied score. Time-sliced data sets
//! are split into an initial-slice network and two-slice transition
//! networks, each with its own static parameter object.
//!
//! Key behaviors
//! -------------
//! - [`ScoreBuilder`] validates inputs, resolves labels, background nodes and
//!   penalties, and dispatches to one family computer in [`families`].
//! - [`ScoreParameters`] is immutable; its family payload is a tagged union
//!   ([`FamilyStats`]) and dynamic objects own their children by value.
//! - [`LocalScore`] is the scoring seam; [`ConjugateScore`] evaluates the
//!   closed-form BGe, BDe and BDeCat scores from a static object.
//!
//! Invariants & assumptions
//! ------------------------
//! - Construction either returns a complete object or a [`ScoreError`];
//!   nothing is partially built.
//! - Static data must be complete. Dynamic data may hold `NaN`; incomplete
//!   rows are dropped per sub-problem and counted.
//!
//! Conventions
//! -----------
//! - Indices are 0-based throughout. Score-constant tables are indexed by
//!   parent count, entry `k` for `k` parents.
//! - Edge penalties are supplied as positive factors and stored as logs.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use ndarray::array;
//! use rust_bnscore::score::prelude::*;
//!
//! let data = ScoreData::new(array![[0.1, 1.2], [0.9, 0.4], [1.7, 2.2], [0.3, 0.8]]);
//! let params = ScoreBuilder::new(ScoreFamily::Gaussian, &data).build()?;
//! let score = ConjugateScore.local_score(1, &[0], &params)?;
//! assert!(score.is_finite());
//! # Ok::<(), ScoreError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/integration_score_pipeline.rs`
//!   runs the end-to-end scenarios for static and dynamic builds.

pub mod builder;
pub mod core;
pub mod dynamic;
pub mod errors;
pub mod families;
pub mod local;
pub mod params;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::builder::ScoreBuilder;
pub use self::core::{
    BdeCatOptions, BdeOptions, BgeOptions, DynamicOptions, FamilyParams, ScoreData, ScoreFamily,
    UserOptions,
};
pub use self::errors::{ScoreError, ScoreResult};
pub use self::local::{ConjugateScore, LocalScore};
pub use self::params::{DynamicParams, FamilyStats, ParamsBody, ScoreParameters, SliceParams};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::builder::ScoreBuilder;
    pub use super::core::{DynamicOptions, FamilyParams, ScoreData, ScoreFamily};
    pub use super::errors::{ScoreError, ScoreResult};
    pub use super::local::{ConjugateScore, LocalScore};
    pub use super::params::{FamilyStats, ScoreParameters};
}
