//! Node labels — resolution for static and time-sliced designs.
//!
//! Labels are taken from, in order of preference: caller-supplied labels,
//! the data's column names (when all present and distinct), or synthesized
//! names. Synthesized static labels are `v1..vn`. Dynamic designs suffix the
//! 1-based slice index to main variables (`v3.2`) and name background
//! variables `s1..sb`.
use crate::score::{
    core::data::ScoreData,
    errors::{ScoreError, ScoreResult},
};
use std::collections::HashSet;

/// Labels of a static design with `n` columns.
///
/// Errors
/// ------
/// - `ScoreError::LabelCountMismatch` when supplied labels are not `n` long.
/// - `ScoreError::DuplicateLabel` when supplied labels repeat.
pub fn resolve_static_labels(
    supplied: Option<&[String]>, data: &ScoreData, n: usize,
) -> ScoreResult<Vec<String>> {
    if let Some(labels) = supplied {
        check_labels(labels, n)?;
        return Ok(labels.to_vec());
    }
    if let Some(names) = data.usable_column_names() {
        return Ok(names.to_vec());
    }
    Ok((1..=n).map(|i| format!("v{i}")).collect())
}

/// Per-column labels of a wide, time-sliced design.
///
/// Fields
/// ------
/// - `background`: one label per static column.
/// - `slices`: for every slice, one label per main variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceLabels {
    pub background: Vec<String>,
    pub slices: Vec<Vec<String>>,
}

impl SliceLabels {
    /// Resolve labels of a wide design with `bgn` static columns followed by
    /// `slices` blocks of `nsmall` columns.
    ///
    /// Supplied labels have length `bgn + nsmall`, in raw column order
    /// (background first), and receive the slice suffix on main variables.
    /// Column names label every wide column individually.
    pub fn resolve(
        supplied: Option<&[String]>, data: &ScoreData, nsmall: usize, bgn: usize, slices: usize,
    ) -> ScoreResult<SliceLabels> {
        if let Some(labels) = supplied {
            check_labels(labels, nsmall + bgn)?;
            let (bg, main) = labels.split_at(bgn);
            return Ok(SliceLabels {
                background: bg.to_vec(),
                slices: (1..=slices)
                    .map(|t| main.iter().map(|l| format!("{l}.{t}")).collect())
                    .collect(),
            });
        }
        if let Some(names) = data.usable_column_names() {
            return Ok(SliceLabels {
                background: names[..bgn].to_vec(),
                slices: (0..slices)
                    .map(|t| names[bgn + t * nsmall..bgn + (t + 1) * nsmall].to_vec())
                    .collect(),
            });
        }
        Ok(SliceLabels {
            background: (1..=bgn).map(|i| format!("s{i}")).collect(),
            slices: (1..=slices)
                .map(|t| (1..=nsmall).map(|i| format!("v{i}.{t}")).collect())
                .collect(),
        })
    }

    /// Labels of the initial-slice design `[slice 0 main, background]`.
    pub fn first_slice(&self) -> Vec<String> {
        self.slices[0].iter().chain(&self.background).cloned().collect()
    }

    /// Labels of the transition design `[slice t+1 main, background, slice t main]`.
    pub fn transition(&self, t: usize) -> Vec<String> {
        self.slices[t + 1]
            .iter()
            .chain(&self.background)
            .chain(&self.slices[t])
            .cloned()
            .collect()
    }
}

fn check_labels(labels: &[String], n: usize) -> ScoreResult<()> {
    if labels.len() != n {
        return Err(ScoreError::LabelCountMismatch { expected: n, found: labels.len() });
    }
    let mut seen = HashSet::with_capacity(n);
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(ScoreError::DuplicateLabel(label.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    // Purpose
    // -------
    // Verify the supplied → column names → synthesized precedence.
    //
    // Given
    // -----
    // - A 1×2 design with names `a, b`, with and without supplied labels,
    //   and an unnamed design.
    //
    // Expect
    // ------
    // - Supplied labels win, then `a, b`, then `v1, v2`.
    fn resolve_static_labels_follows_precedence() {
        let named = ScoreData::with_column_names(Array2::zeros((1, 2)), names(&["a", "b"])).unwrap();
        let unnamed = ScoreData::new(Array2::zeros((1, 2)));
        let supplied = names(&["x", "y"]);

        assert_eq!(resolve_static_labels(Some(&supplied), &named, 2).unwrap(), supplied);
        assert_eq!(resolve_static_labels(None, &named, 2).unwrap(), names(&["a", "b"]));
        assert_eq!(resolve_static_labels(None, &unnamed, 2).unwrap(), names(&["v1", "v2"]));
    }

    #[test]
    // Purpose
    // -------
    // Supplied labels must be unique and of length n.
    //
    // Given
    // -----
    // - `["x", "x"]` and `["x"]` for n = 2.
    //
    // Expect
    // ------
    // - `DuplicateLabel("x")` and `LabelCountMismatch`.
    fn resolve_static_labels_checks_supplied_labels() {
        let data = ScoreData::new(Array2::zeros((1, 2)));

        assert_eq!(
            resolve_static_labels(Some(&names(&["x", "x"])), &data, 2),
            Err(ScoreError::DuplicateLabel("x".into()))
        );
        assert_eq!(
            resolve_static_labels(Some(&names(&["x"])), &data, 2),
            Err(ScoreError::LabelCountMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Check synthesized dynamic labels and their sub-design orderings.
    //
    // Given
    // -----
    // - nsmall = 2, bgn = 1, slices = 3, unnamed data (7 columns).
    //
    // Expect
    // ------
    // - First slice `[v1.1, v2.1, s1]`; transition 1 `[v1.3, v2.3, s1, v1.2, v2.2]`.
    fn slice_labels_synthesize_suffixes_and_background_prefix() {
        let data = ScoreData::new(Array2::zeros((1, 7)));

        let labels = SliceLabels::resolve(None, &data, 2, 1, 3).unwrap();

        assert_eq!(labels.first_slice(), names(&["v1.1", "v2.1", "s1"]));
        assert_eq!(labels.transition(1), names(&["v1.3", "v2.3", "s1", "v1.2", "v2.2"]));
    }

    #[test]
    // Purpose
    // -------
    // Supplied dynamic labels are given in raw order and suffixed per slice.
    //
    // Given
    // -----
    // - Labels `[age, x, y]` with bgn = 1, nsmall = 2, slices = 2.
    //
    // Expect
    // ------
    // - Transition 0 labels `[x.2, y.2, age, x.1, y.1]`.
    fn slice_labels_suffix_supplied_main_labels() {
        let data = ScoreData::new(Array2::zeros((1, 5)));
        let supplied = names(&["age", "x", "y"]);

        let labels = SliceLabels::resolve(Some(&supplied), &data, 2, 1, 2).unwrap();

        assert_eq!(labels.transition(0), names(&["x.2", "y.2", "age", "x.1", "y.1"]));
    }

    #[test]
    // Purpose
    // -------
    // Column names label each wide column as-is.
    //
    // Given
    // -----
    // - Names `[a1, b1, a2, b2]`, bgn = 0, nsmall = 2, slices = 2.
    //
    // Expect
    // ------
    // - First slice `[a1, b1]`, transition `[a2, b2, a1, b1]`.
    fn slice_labels_use_column_names_per_column() {
        let data =
            ScoreData::with_column_names(Array2::zeros((1, 4)), names(&["a1", "b1", "a2", "b2"]))
                .unwrap();

        let labels = SliceLabels::resolve(None, &data, 2, 0, 2).unwrap();

        assert_eq!(labels.first_slice(), names(&["a1", "b1"]));
        assert_eq!(labels.transition(0), names(&["a2", "b2", "a1", "b1"]));
    }
}
