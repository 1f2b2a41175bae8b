//! Index maps of the compact two-slice adjacency space.
//!
//! Purpose
//! -------
//! A dynamic network is scored through a compact adjacency matrix over
//! `2·nsmall + bgn` nodes covering two consecutive slices and the static
//! (background) variables. This module computes, as explicit index ranges,
//! which rows (parents) and columns (children) of that matrix hold
//! within-slice edges and which hold transition edges, both for the internal
//! column order used by the score objects and for the user-facing order of
//! the raw data.
//!
//! Conventions
//! -----------
//! - Internal order: `[future main (nsmall), background (bgn), past main (nsmall)]`.
//! - User order: `[background (bgn), past main (nsmall), future main (nsmall)]`,
//!   i.e. the first `bgn + 2·nsmall` columns of the wide data set.
//! - Initial-slice order: `[slice 0 main (nsmall), background (bgn)]`.
//! - Rows are parents, columns are children; ranges are half-open.
//! - Background nodes never receive parents, so no block has background
//!   columns.
use std::ops::Range;

/// One block of the adjacency space: a union of row ranges times a column range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBlock {
    pub rows: Vec<Range<usize>>,
    pub cols: Range<usize>,
}

impl IndexBlock {
    fn new(rows: Vec<Range<usize>>, cols: Range<usize>) -> IndexBlock {
        IndexBlock { rows: rows.into_iter().filter(|r| !r.is_empty()).collect(), cols }
    }

    /// All row indices in ascending range order.
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows.iter().flat_map(|r| r.clone()).collect()
    }

    /// Whether the edge `row → col` lies inside the block.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cols.contains(&col) && self.rows.iter().any(|r| r.contains(&row))
    }
}

/// `DynamicIndexMaps` — within-slice and transition blocks in both orders.
///
/// Fields
/// ------
/// - `within`, `transition`: blocks over the internal order.
/// - `user_within`, `user_transition`: the same partition over the user order,
///   for externally supplied scores unaware of the internal reordering.
///
/// Invariants
/// ----------
/// - `within ∪ transition` covers every admissible edge into the future
///   slice exactly once; the same holds for the user blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicIndexMaps {
    pub nsmall: usize,
    pub bgn: usize,
    pub within: IndexBlock,
    pub transition: IndexBlock,
    pub user_within: IndexBlock,
    pub user_transition: IndexBlock,
}

impl DynamicIndexMaps {
    pub fn new(nsmall: usize, bgn: usize) -> DynamicIndexMaps {
        let future = 0..nsmall;
        let past = nsmall + bgn..2 * nsmall + bgn;
        let user_bg = 0..bgn;
        let user_past = bgn..bgn + nsmall;
        let user_future = bgn + nsmall..bgn + 2 * nsmall;

        DynamicIndexMaps {
            nsmall,
            bgn,
            within: IndexBlock::new(vec![0..nsmall + bgn], future.clone()),
            transition: IndexBlock::new(vec![past], future),
            user_within: IndexBlock::new(vec![user_bg, user_future.clone()], user_future.clone()),
            user_transition: IndexBlock::new(vec![user_past], user_future),
        }
    }

    /// Size of the compact adjacency space.
    pub fn dim(&self) -> usize {
        2 * self.nsmall + self.bgn
    }
}

/// User-order column for every internal column of the two-slice space.
///
/// `internal[i] = user[order[i]]`; the same order selects the first
/// `bgn + 2·nsmall` wide columns when `offset = 0`. For a later slice pair
/// `(t, t+1)` pass `offset = t·nsmall` to shift the slice columns while the
/// background columns stay in place.
pub fn transition_order(nsmall: usize, bgn: usize, offset: usize) -> Vec<usize> {
    let future = (bgn + nsmall + offset)..(bgn + 2 * nsmall + offset);
    let background = 0..bgn;
    let past = (bgn + offset)..(bgn + nsmall + offset);
    future.chain(background).chain(past).collect()
}

/// Wide-data column for every column of the initial-slice design.
pub fn first_slice_order(nsmall: usize, bgn: usize) -> Vec<usize> {
    (bgn..bgn + nsmall).chain(0..bgn).collect()
}

/// Background indices of the transition design: static and past-slice nodes.
pub fn transition_background(nsmall: usize, bgn: usize) -> Vec<usize> {
    (nsmall..2 * nsmall + bgn).collect()
}

/// Background indices of the initial-slice design.
pub fn first_slice_background(nsmall: usize, bgn: usize) -> Vec<usize> {
    (nsmall..nsmall + bgn).collect()
}
