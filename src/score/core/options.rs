//! Score options — family hyperparameters and dynamic-network layout.
//!
//! Purpose
//! -------
//! Collect the configuration records consumed by the score-parameter builder:
//! the score family tag, per-family hyperparameters, and the dynamic-network
//! layout. Every record has documented defaults through `Default`, and
//! defaults that depend on the data (the Wishart degrees of freedom `aw`) are
//! resolved functionally into a fully populated copy.
//!
//! Key behaviors
//! -------------
//! - [`ScoreFamily`] parses the tags `bge`, `bde`, `bdecat` and `usr`.
//! - [`BgeOptions`], [`BdeOptions`], [`BdeCatOptions`], [`UserOptions`] hold
//!   the hyperparameters of each family and validate them in `resolve`.
//! - [`FamilyParams`] bundles all four records; the builder picks the one
//!   matching the requested family.
//! - [`DynamicOptions`] describes slices, static columns and stationarity.
//!
//! Invariants & assumptions
//! ------------------------
//! - `am > 0`, `aw > n + 1`, `chi > 0`, every `edgepf > 0`, all finite.
//! - Resolution never mutates the caller's record; it returns a new value.
//!
//! Testing notes
//! -------------
//! - Unit tests cover defaults, tag parsing, and each validation branch.
use crate::score::errors::{ScoreError, ScoreResult};
use std::str::FromStr;

/// Parametric family of the local score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreFamily {
    /// Continuous data, Normal-Wishart prior (BGe).
    Gaussian,
    /// Binary data, Dirichlet prior (BDe).
    Binary,
    /// Multi-level categorical data, Dirichlet prior (BDeCat).
    Categorical,
    /// Externally supplied local score.
    UserDefined,
}

impl ScoreFamily {
    /// Short tag used by configuration files and bindings.
    pub fn tag(&self) -> &'static str {
        match self {
            ScoreFamily::Gaussian => "bge",
            ScoreFamily::Binary => "bde",
            ScoreFamily::Categorical => "bdecat",
            ScoreFamily::UserDefined => "usr",
        }
    }
}

impl FromStr for ScoreFamily {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bge" => Ok(ScoreFamily::Gaussian),
            "bde" => Ok(ScoreFamily::Binary),
            "bdecat" => Ok(ScoreFamily::Categorical),
            "usr" => Ok(ScoreFamily::UserDefined),
            _ => Err(ScoreError::InvalidScoreFamily(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScoreFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// `BgeOptions` — Normal-Wishart hyperparameters.
///
/// Fields
/// ------
/// - `am`: `f64`
///   Prior precision scale of the mean; must be > 0. Default `1.0`.
/// - `aw`: `Option<f64>`
///   Prior Wishart degrees of freedom. `None` resolves to `n + am + 1`;
///   an explicit value must exceed `n + 1`.
/// - `edgepf`: `f64`
///   Per-parent penalty factor; must be > 0. Default `1.0` (no penalty).
#[derive(Debug, Clone, PartialEq)]
pub struct BgeOptions {
    pub am: f64,
    pub aw: Option<f64>,
    pub edgepf: f64,
}

/// Fully populated BGe hyperparameters for a problem with `n` nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBge {
    pub am: f64,
    pub aw: f64,
    pub edgepf: f64,
}

impl BgeOptions {
    pub fn new(am: f64, aw: Option<f64>, edgepf: f64) -> BgeOptions {
        BgeOptions { am, aw, edgepf }
    }

    /// Validate and fill in data-dependent defaults for `n` nodes.
    ///
    /// Errors
    /// ------
    /// - `ScoreError::InvalidHyperparameter`
    ///   Returned when `am ≤ 0`, `aw ≤ n + 1`, `edgepf ≤ 0`, or any value
    ///   is non-finite.
    pub fn resolve(&self, n: usize) -> ScoreResult<ResolvedBge> {
        ensure_positive("am", self.am)?;
        ensure_positive("edgepf", self.edgepf)?;
        let aw = self.aw.unwrap_or(n as f64 + self.am + 1.0);
        if !aw.is_finite() || aw <= n as f64 + 1.0 {
            return Err(ScoreError::InvalidHyperparameter {
                name: "aw",
                value: aw,
                reason: "Must exceed the node count plus one.",
            });
        }
        Ok(ResolvedBge { am: self.am, aw, edgepf: self.edgepf })
    }
}

impl Default for BgeOptions {
    fn default() -> Self {
        BgeOptions { am: 1.0, aw: None, edgepf: 1.0 }
    }
}

/// `BdeOptions` — Dirichlet hyperparameters for binary data.
///
/// Fields
/// ------
/// - `chi`: total pseudo-count, > 0. Default `0.5`.
/// - `edgepf`: per-parent penalty factor, > 0. Default `2.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct BdeOptions {
    pub chi: f64,
    pub edgepf: f64,
}

impl BdeOptions {
    pub fn new(chi: f64, edgepf: f64) -> BdeOptions {
        BdeOptions { chi, edgepf }
    }

    /// Validate `chi` and `edgepf`.
    pub fn resolve(&self) -> ScoreResult<BdeOptions> {
        ensure_positive("chi", self.chi)?;
        ensure_positive("edgepf", self.edgepf)?;
        Ok(self.clone())
    }
}

impl Default for BdeOptions {
    fn default() -> Self {
        BdeOptions { chi: 0.5, edgepf: 2.0 }
    }
}

/// `BdeCatOptions` — Dirichlet hyperparameters for categorical data.
///
/// Fields
/// ------
/// - `chi`: total pseudo-count, > 0. Default `0.5`.
/// - `edgepf`: per-parent penalty factor, > 0. Default `2.0`.
/// - `levels`: optional explicit level count per variable. When `None`,
///   levels are read off the data as `max + 1` and the observed values must
///   cover `0..=max` without gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct BdeCatOptions {
    pub chi: f64,
    pub edgepf: f64,
    pub levels: Option<Vec<usize>>,
}

impl BdeCatOptions {
    pub fn new(chi: f64, edgepf: f64, levels: Option<Vec<usize>>) -> BdeCatOptions {
        BdeCatOptions { chi, edgepf, levels }
    }

    /// Validate `chi` and `edgepf`; level vectors are checked against data.
    pub fn resolve(&self) -> ScoreResult<BdeCatOptions> {
        ensure_positive("chi", self.chi)?;
        ensure_positive("edgepf", self.edgepf)?;
        Ok(self.clone())
    }
}

impl Default for BdeCatOptions {
    fn default() -> Self {
        BdeCatOptions { chi: 0.5, edgepf: 2.0, levels: None }
    }
}

/// `UserOptions` — settings of a user-defined score family.
///
/// Fields
/// ------
/// - `pc_test`: built-in family whose conditional-independence test a
///   search layer should use to seed its search space. Default `Gaussian`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserOptions {
    pub pc_test: ScoreFamily,
}

impl UserOptions {
    pub fn resolve(&self) -> ScoreResult<UserOptions> {
        if self.pc_test == ScoreFamily::UserDefined {
            return Err(ScoreError::InvalidPcTest);
        }
        Ok(self.clone())
    }
}

impl Default for UserOptions {
    fn default() -> Self {
        UserOptions { pc_test: ScoreFamily::Gaussian }
    }
}

/// Hyperparameters for every family; only the requested one is read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FamilyParams {
    pub bge: BgeOptions,
    pub bde: BdeOptions,
    pub bdecat: BdeCatOptions,
    pub usr: UserOptions,
}

impl FamilyParams {
    /// Copy with every penalty factor set to `1`, as used for the initial
    /// slice of a dynamic network.
    pub fn without_edge_penalty(&self) -> FamilyParams {
        let mut out = self.clone();
        out.bge.edgepf = 1.0;
        out.bde.edgepf = 1.0;
        out.bdecat.edgepf = 1.0;
        out
    }

    /// Copy with the categorical level vector replaced.
    pub fn with_levels(&self, levels: Option<Vec<usize>>) -> FamilyParams {
        let mut out = self.clone();
        out.bdecat.levels = levels;
        out
    }
}

/// `DynamicOptions` — layout of a time-sliced data set.
///
/// Fields
/// ------
/// - `slices`: number of time slices in the wide data set, ≥ 2. Default `2`.
/// - `static_count`: number of leading static (background) columns shared
///   by every slice. Default `0`.
/// - `stationary`: whether every transition shares one structure. Default
///   `true`.
/// - `same_structure`: whether the initial slice shares the within-slice
///   structure of the transitions. Construction never reads it; it is
///   stored in `DynamicParams` for structure-search layers only. Default
///   `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicOptions {
    pub slices: usize,
    pub static_count: usize,
    pub stationary: bool,
    pub same_structure: bool,
}

impl DynamicOptions {
    pub fn new(slices: usize, static_count: usize, stationary: bool) -> DynamicOptions {
        DynamicOptions { slices, static_count, stationary, same_structure: true }
    }
}

impl Default for DynamicOptions {
    fn default() -> Self {
        DynamicOptions { slices: 2, static_count: 0, stationary: true, same_structure: true }
    }
}

fn ensure_positive(name: &'static str, value: f64) -> ScoreResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ScoreError::InvalidHyperparameter {
            name,
            value,
            reason: "Must be finite and > 0.",
        });
    }
    Ok(())
}
