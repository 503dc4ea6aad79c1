//! Exact contiguous subsequence matching over top-level statements.

use crate::analysis::normalize::{normalize_stmt, DropSet};
use crate::syntax::Stmt;

/// Locate the leftmost contiguous run of statements in `haystack` that is
/// structurally equal, element by element, to `needle`.
///
/// Returns the haystack indices of the matching window, or an empty vector
/// when no window matches. An empty needle never matches: a search pattern
/// with zero elements is defined as never satisfiable. Blank-line sentinels
/// on either side are layout, not structure: they are invisible to the
/// match, so a run split by a blank line is still contiguous. Windows are
/// checked left to right and the first fully matching one wins; no attempt
/// is made to find a best or longest match. Indices refer to the original
/// haystack so callers can act on nodes carrying live metadata.
pub fn match_exact_sequence(haystack: &[Stmt], needle: &[Stmt], drop: &DropSet) -> Vec<usize> {
    let needle_norm: Vec<Stmt> = needle
        .iter()
        .filter(|s| !s.is_blank())
        .map(|s| normalize_stmt(s, drop))
        .collect();
    let haystack_norm: Vec<(usize, Stmt)> = haystack
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_blank())
        .map(|(i, s)| (i, normalize_stmt(s, drop)))
        .collect();

    if needle_norm.is_empty() || needle_norm.len() > haystack_norm.len() {
        return Vec::new();
    }

    for start in 0..=(haystack_norm.len() - needle_norm.len()) {
        let window = &haystack_norm[start..start + needle_norm.len()];
        if window.iter().zip(&needle_norm).all(|((_, h), n)| h == n) {
            return window.iter().map(|(i, _)| *i).collect();
        }
    }

    Vec::new()
}
