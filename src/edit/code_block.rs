//! Titled code-block insertion with duplicate detection.
//!
//! A block is parsed from raw candidate code, filtered against what the tree
//! already contains, annotated with a title comment, and spliced at an
//! anchor-relative position. Every fallible step runs before the first
//! mutation, so a failed insertion leaves the tree untouched.

use serde::{Deserialize, Serialize};

use crate::analysis::{match_exact_sequence, stmt_exists, DropSet};
use crate::edit::comments::create_comments;
use crate::errors::{unspanned, ErrorReporting, GraftError};
use crate::runner::{Session, Transform};
use crate::syntax::{parser, Stmt};

/// Where the block lands relative to a matched anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    #[default]
    After,
}

/// How to react when part (or all) of the candidate block is already in the
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Insert only when no candidate statement is present yet.
    #[default]
    Strict,
    /// Insert just the statements that are missing.
    Selective,
    /// Insert unconditionally.
    #[serde(alias = "complete")]
    Never,
}

/// The statement run to search for as the insertion anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAnchor {
    /// Raw code, parsed into statements before matching.
    Code(String),
    /// Pre-built statement descriptors, matched as-is.
    Nodes(Vec<Stmt>),
}

/// Whether to splice blank-line sentinels around the inserted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlinePolicy {
    Before,
    After,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCodeBlock {
    /// Rendered as leading line comments on the first inserted statement.
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub search: Option<SearchAnchor>,
    #[serde(default)]
    pub location: Placement,
    #[serde(default)]
    pub ignore: DuplicatePolicy,
    #[serde(default)]
    pub newline: Option<NewlinePolicy>,
}

impl Transform for AddCodeBlock {
    fn name(&self) -> &'static str {
        "add-code-block"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        session.title(&format!("Add code block '{}'.", self.title));

        let candidate = match parser::parse_fragment(&self.code, "code block") {
            Ok(stmts) => stmts,
            Err(error) => return session.recoverable(error),
        };
        if candidate.is_empty() {
            return session.recoverable(session.empty_fragment("code block"));
        }

        let mut chosen = match self.resolve_duplicates(session, candidate) {
            Ok(Some(chosen)) => chosen,
            Ok(None) => return Ok(()),
            Err(error) => return session.recoverable(error),
        };

        // Anchor resolution happens before any mutation.
        let at = match self.resolve_position(session) {
            Ok(Some(at)) => at,
            Ok(None) => {
                let error = session.anchor_not_found().with_help(
                    "the search pattern must match a contiguous run of top-level statements",
                );
                return session.recoverable(error);
            }
            Err(error) => return session.recoverable(error),
        };

        chosen[0].comments.splice(0..0, create_comments(&self.title, true, true));

        if matches!(self.newline, Some(NewlinePolicy::After | NewlinePolicy::Both)) {
            chosen.push(Stmt::blank());
        }
        if matches!(self.newline, Some(NewlinePolicy::Before | NewlinePolicy::Both)) {
            chosen.insert(0, Stmt::blank());
        }

        session.info(&format!(
            "Inserting {} statement(s) at position {}.",
            chosen.len(),
            at
        ));
        session.module.body.splice(at..at, chosen);
        Ok(())
    }
}

impl AddCodeBlock {
    /// Filter the candidate against tree content per the duplicate policy.
    /// `Ok(None)` means the block is fully present and the run is a no-op;
    /// partial presence under the strict policy is a duplicate conflict.
    fn resolve_duplicates(
        &self,
        session: &Session,
        candidate: Vec<Stmt>,
    ) -> Result<Option<Vec<Stmt>>, GraftError> {
        if self.ignore == DuplicatePolicy::Never {
            session.info("Duplicate checking disabled, inserting unconditionally.");
            return Ok(Some(candidate));
        }

        let drop = DropSet::for_membership();
        let (present, missing): (Vec<_>, Vec<_>) = candidate
            .into_iter()
            .partition(|stmt| stmt_exists(&session.module.body, stmt, &drop));

        if missing.is_empty() {
            session.warning(&format!(
                "Code block '{}' already exists and will be (safely) ignored.",
                self.title
            ));
            return Ok(None);
        }
        if present.is_empty() {
            return Ok(Some(missing));
        }

        match self.ignore {
            DuplicatePolicy::Strict => Err(session.duplicate_conflict(
                format!(
                    "code block '{}' is partially present; refusing partial insertion",
                    self.title
                ),
                unspanned(),
            )),
            DuplicatePolicy::Selective => {
                session.info(&format!(
                    "Code block '{}' partially exists, inserting the {} missing statement(s).",
                    self.title,
                    missing.len()
                ));
                Ok(Some(missing))
            }
            DuplicatePolicy::Never => unreachable!("handled above"),
        }
    }

    /// Resolve the insertion index. `Ok(None)` means the anchor did not
    /// match.
    fn resolve_position(&self, session: &Session) -> Result<Option<usize>, GraftError> {
        let Some(anchor) = &self.search else {
            return Ok(Some(session.module.body.len()));
        };

        let needle = match anchor {
            SearchAnchor::Code(code) => parser::parse_fragment(code, "search pattern")?,
            SearchAnchor::Nodes(nodes) => nodes.clone(),
        };
        if needle.is_empty() {
            return Err(session.empty_fragment("search pattern"));
        }

        let indices =
            match_exact_sequence(&session.module.body, &needle, &DropSet::for_anchor());
        if indices.is_empty() {
            return Ok(None);
        }

        Ok(Some(match self.location {
            Placement::Before => indices[0],
            Placement::After => indices[indices.len() - 1] + 1,
        }))
    }
}
