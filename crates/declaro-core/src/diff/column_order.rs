//! Column placement.

use std::collections::BTreeSet;

/// Returns the longest run of `desired` (not necessarily contiguous) that
/// already appears in the same relative order in `actual`.
///
/// Both slices hold lowercase names of the columns the two tables share.
/// Columns outside the returned set are the ones that have to move.
pub(super) fn stable_columns(actual: &[String], desired: &[String]) -> BTreeSet<String> {
    let (n, m) = (actual.len(), desired.len());
    let mut lengths = vec![vec![0_usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if actual[i] == desired[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut stable = BTreeSet::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if actual[i] == desired[j] {
            stable.insert(actual[i].clone());
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    stable
}
