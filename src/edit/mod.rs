//! Structural edit operations over a module tree.
//!
//! Each operation is a `Transform` bound to its own context struct. All of
//! them re-derive "already present" from tree content on every run, so
//! re-applying an edit is always a reported no-op rather than a duplicate.

pub mod code_block;
pub mod comments;
pub mod config_object;
pub mod imports;
pub mod register_call;

pub use code_block::{AddCodeBlock, DuplicatePolicy, NewlinePolicy, Placement, SearchAnchor};
pub use comments::create_comments;
pub use config_object::{AddConfigProperty, ConstructorRef};
pub use imports::{AddImport, RemoveImport, SpecifierRequest};
pub use register_call::AddRegistrationCall;

use crate::syntax::{Module, Stmt};

/// Insert `stmt` after the last import declaration and any blank-line
/// sentinels that follow it, or at the very start of the tree when it has no
/// imports.
pub(crate) fn insert_after_imports_or_at_start(module: &mut Module, stmt: Stmt) {
    let mut at = module
        .import_indices()
        .last()
        .map(|i| i + 1)
        .unwrap_or(0);
    while module.body.get(at).map(|s| s.is_blank()).unwrap_or(false) {
        at += 1;
    }
    module.body.insert(at, stmt);
}

/// Index of the last statement satisfying `pred`, if any.
pub(crate) fn last_index_where<F>(body: &[Stmt], pred: F) -> Option<usize>
where
    F: Fn(&Stmt) -> bool,
{
    body.iter().rposition(pred)
}
