//! score::errors — error type for score-parameter construction and scoring.
//!
//! Purpose
//! -------
//! Provide a single error enum, [`ScoreError`], and result alias
//! [`ScoreResult`] shared by the builder, the family computers, the dynamic
//! layering engine and the reference local scorer. Every construction-time
//! variant belongs to the *invalid argument* class: it is detected eagerly,
//! is deterministic, and aborts the whole build so that no partially built
//! [`ScoreParameters`](crate::score::params::ScoreParameters) ever escapes.
//!
//! Key behaviors
//! -------------
//! - Carry the offending value or index in each variant so that callers can
//!   log or report the failure without access to the input data.
//! - Attach human-readable `Display` messages phrased in terms of domain
//!   constraints ("chi must be > 0", "levels must be numbered from 0").
//! - Convert into a Python `ValueError` when the `python-bindings` feature is
//!   enabled.
//!
//! Conventions
//! -----------
//! - **Indices are 0-based** (rows, columns, nodes).
//! - Missing values are `NaN`; they are reported through
//!   [`ScoreError::MissingData`] in static mode only. Dynamic mode drops the
//!   affected rows instead.
//!
//! Testing notes
//! -------------
//! - Unit tests check that payloads are embedded in the `Display` output and
//!   that [`ScoreError::is_invalid_argument`] classifies construction errors.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for score-parameter operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// Unified error type for score-parameter construction and local scoring.
///
/// Variants are grouped by the stage that raises them. All variants above
/// the "local scoring" group are input-validation failures of the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    // ---- Family / configuration ----
    /// Score family tag is not one of `bge`, `bde`, `bdecat`, `usr`.
    InvalidScoreFamily(String),

    /// A family hyperparameter violates its domain constraint.
    InvalidHyperparameter { name: &'static str, value: f64, reason: &'static str },

    /// The user-defined family asked for a pc-test family that is itself user-defined.
    InvalidPcTest,

    // ---- Data shape ----
    /// Design matrix has no rows or no columns.
    EmptyData { rows: usize, cols: usize },

    /// Column count does not match the node layout.
    ColumnCountMismatch { expected: usize, found: usize },

    /// Column-name vector length does not match the column count.
    ColumnNameCountMismatch { expected: usize, found: usize },

    /// Static data contains a missing value.
    MissingData { row: usize, col: usize },

    // ---- Dynamic layout ----
    /// Dynamic networks need at least two slices.
    InvalidSlices(usize),

    /// Static-column count leaves no room for the slice blocks.
    InvalidStaticCount { static_count: usize, cols: usize },

    /// A background index list was combined with dynamic mode.
    BackgroundInDynamic,

    // ---- Weights ----
    /// Weight vector length differs from the row count.
    WeightLengthMismatch { expected: usize, found: usize },

    /// Weight is non-finite or not strictly positive.
    InvalidWeight { index: usize, value: f64 },

    // ---- Nodes and labels ----
    /// Background node index is outside `0..n`.
    InvalidBackgroundNode { index: usize, n: usize },

    /// Background node index listed twice.
    DuplicateBackgroundNode(usize),

    /// Supplied label vector has the wrong length.
    LabelCountMismatch { expected: usize, found: usize },

    /// Supplied labels are not unique.
    DuplicateLabel(String),

    // ---- Family-specific data checks ----
    /// Binary family received a value outside `{0, 1}`.
    NonBinaryValue { row: usize, col: usize, value: f64 },

    /// Categorical family received a negative or non-integer value.
    InvalidCategoricalValue { row: usize, col: usize, value: f64 },

    /// Observed levels of a categorical column skip a value in `0..=max`.
    CategoricalLevelGap { col: usize, missing: usize },

    /// Explicit level-count vector has the wrong length.
    LevelCountMismatch { expected: usize, found: usize },

    /// Explicit level count does not cover the observed values.
    LevelTooSmall { col: usize, levels: usize, observed_max: usize },

    // ---- Edge penalty ----
    /// Penalty matrix shape does not match the adjacency space.
    PenaltyShapeMismatch { expected: usize, rows: usize, cols: usize },

    /// Penalty entry is not strictly positive (or not finite).
    NonPositivePenalty { row: usize, col: usize, value: f64 },

    // ---- Local scoring ----
    /// Node index is outside `0..n`.
    NodeOutOfRange { node: usize, n: usize },

    /// Parent set is malformed for the requested node.
    InvalidParentSet { node: usize, reason: &'static str },

    /// Parent set too large for the configuration index.
    TooManyParents { count: usize, max: usize },

    /// Dynamic objects are scored through their slice children.
    DynamicRequiresSlice,

    /// User-defined families are scored by their own `LocalScore` implementation.
    UserDefinedScore,

    /// Parent block of the posterior scatter matrix is not positive definite.
    NotPositiveDefinite { node: usize },
}

impl ScoreError {
    /// Whether the error is an input-validation failure raised while building
    /// a parameter object.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(
            self,
            ScoreError::NodeOutOfRange { .. }
                | ScoreError::InvalidParentSet { .. }
                | ScoreError::TooManyParents { .. }
                | ScoreError::DynamicRequiresSlice
                | ScoreError::UserDefinedScore
                | ScoreError::NotPositiveDefinite { .. }
        )
    }
}

impl std::error::Error for ScoreError {}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::InvalidScoreFamily(tag) => {
                write!(f, "Invalid score family '{tag}'. Expected one of bge, bde, bdecat, usr.")
            }
            ScoreError::InvalidHyperparameter { name, value, reason } => {
                write!(f, "Invalid hyperparameter {name} = {value}. {reason}")
            }
            ScoreError::InvalidPcTest => {
                write!(f, "pc-test family of a user-defined score must be bge, bde or bdecat.")
            }
            ScoreError::EmptyData { rows, cols } => {
                write!(f, "Design matrix must be non-empty; got {rows} rows and {cols} columns.")
            }
            ScoreError::ColumnCountMismatch { expected, found } => {
                write!(f, "Column count mismatch: expected {expected}, found {found}.")
            }
            ScoreError::ColumnNameCountMismatch { expected, found } => {
                write!(f, "Column names mismatch: expected {expected} names, found {found}.")
            }
            ScoreError::MissingData { row, col } => {
                write!(f, "Missing value at row {row}, column {col}; static data must be complete.")
            }
            ScoreError::InvalidSlices(slices) => {
                write!(f, "Dynamic networks need at least 2 slices; got {slices}.")
            }
            ScoreError::InvalidStaticCount { static_count, cols } => {
                write!(f, "Static column count {static_count} is incompatible with {cols} data columns.")
            }
            ScoreError::BackgroundInDynamic => {
                write!(f, "Background nodes of a dynamic network are set via the static column count.")
            }
            ScoreError::WeightLengthMismatch { expected, found } => {
                write!(f, "Weight vector length {found} does not match row count {expected}.")
            }
            ScoreError::InvalidWeight { index, value } => {
                write!(f, "Weight at index {index} must be finite and > 0; got {value}.")
            }
            ScoreError::InvalidBackgroundNode { index, n } => {
                write!(f, "Background node {index} is out of range for {n} nodes.")
            }
            ScoreError::DuplicateBackgroundNode(index) => {
                write!(f, "Background node {index} is listed more than once.")
            }
            ScoreError::LabelCountMismatch { expected, found } => {
                write!(f, "Expected {expected} node labels, found {found}.")
            }
            ScoreError::DuplicateLabel(label) => {
                write!(f, "Node label '{label}' is not unique.")
            }
            ScoreError::NonBinaryValue { row, col, value } => {
                write!(f, "Binary data must be 0 or 1; got {value} at row {row}, column {col}.")
            }
            ScoreError::InvalidCategoricalValue { row, col, value } => {
                write!(
                    f,
                    "Categorical data must be non-negative integers; got {value} at row {row}, column {col}."
                )
            }
            ScoreError::CategoricalLevelGap { col, missing } => {
                write!(
                    f,
                    "Levels of categorical column {col} must be numbered from 0 without gaps; level {missing} never occurs."
                )
            }
            ScoreError::LevelCountMismatch { expected, found } => {
                write!(f, "Expected {expected} level counts, found {found}.")
            }
            ScoreError::LevelTooSmall { col, levels, observed_max } => {
                write!(
                    f,
                    "Level count {levels} of column {col} does not cover observed value {observed_max}."
                )
            }
            ScoreError::PenaltyShapeMismatch { expected, rows, cols } => {
                write!(f, "Edge penalty matrix must be {expected}x{expected}; got {rows}x{cols}.")
            }
            ScoreError::NonPositivePenalty { row, col, value } => {
                write!(f, "Edge penalty entries must be > 0; got {value} at ({row}, {col}).")
            }
            ScoreError::NodeOutOfRange { node, n } => {
                write!(f, "Node {node} is out of range for {n} nodes.")
            }
            ScoreError::InvalidParentSet { node, reason } => {
                write!(f, "Invalid parent set for node {node}: {reason}")
            }
            ScoreError::TooManyParents { count, max } => {
                write!(f, "Parent set of size {count} exceeds the supported maximum of {max}.")
            }
            ScoreError::DynamicRequiresSlice => {
                write!(f, "Dynamic score parameters are scored through their slice objects.")
            }
            ScoreError::UserDefinedScore => {
                write!(f, "User-defined score families must supply their own local score.")
            }
            ScoreError::NotPositiveDefinite { node } => {
                write!(f, "Posterior scatter block for node {node} is not positive definite.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ScoreError> for PyErr {
    fn from(err: ScoreError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
