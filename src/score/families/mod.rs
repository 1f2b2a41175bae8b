//! score::families — per-family sufficient statistics.
//!
//! - [`bge`]: Normal-Wishart posterior parameters for continuous data.
//! - [`bde`]: weighted indicator tables for binary data.
//! - [`bdecat`]: level counts for categorical data.
//!
//! Each computer is a pure function of a complete design matrix and resolved
//! hyperparameters and returns a plain stats record.

pub mod bde;
pub mod bdecat;
pub mod bge;

pub use self::bde::{BdeStats, compute_bde};
pub use self::bdecat::{BdeCatStats, compute_bdecat};
pub use self::bge::{BgeStats, compute_bge};
