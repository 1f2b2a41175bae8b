//! score::core — shared building blocks of score-parameter construction.
//!
//! Purpose
//! -------
//! Hold the pieces every family computer and the layering engine rely on:
//! the design-matrix container and missing-data filter ([`data`]), option
//! records and family tags ([`options`]), input guards ([`validation`]),
//! node labels ([`labels`]), edge penalties ([`penalty`]) and the index maps
//! of the compact two-slice space ([`index_map`]).
//!
//! Conventions
//! -----------
//! - Indices are 0-based; missing values are `NaN`.
//! - Helpers return [`ScoreResult`](crate::score::errors::ScoreResult) and do
//!   not log, except for the missing-data filter which reports dropped rows
//!   at `debug` level.

pub mod data;
pub mod index_map;
pub mod labels;
pub mod options;
pub mod penalty;
pub mod validation;

pub use self::data::{MissingFilter, ScoreData, filter_missing};
pub use self::index_map::{DynamicIndexMaps, IndexBlock};
pub use self::options::{
    BdeCatOptions, BdeOptions, BgeOptions, DynamicOptions, FamilyParams, ScoreFamily, UserOptions,
};
