//! Structural analysis: node normalization, equality, and subsequence
//! matching. Everything here returns indices or copies, never live aliases
//! into the tree, so later insertion cannot corrupt a match result.

pub mod matcher;
pub mod normalize;

pub use matcher::match_exact_sequence;
pub use normalize::{normalize_stmt, stmt_exists, structurally_equal, DropSet};
