//! Import declaration management: adding and removing import bindings.
//!
//! Adds merge into a compatible existing declaration where one exists and
//! otherwise create a new declaration at a deterministic position; removals
//! prune declarations left without specifiers. Local binding names are kept
//! unique across all import declarations in the tree, not just same-source
//! ones.

use serde::{Deserialize, Serialize};

use crate::edit::comments::create_comments;
use crate::errors::GraftError;
use crate::runner::{Session, Transform};
use crate::syntax::{
    source_type, Exported, ImportDecl, ImportSpecifier, Module, SourceType, Span, Stmt, StmtKind,
};

/// A requested import binding: the exported name (an identifier, `default`,
/// or the namespace token `*`) paired with the local name to bind it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecifierRequest {
    pub exported: Exported,
    pub local: String,
}

impl SpecifierRequest {
    pub fn named(exported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            exported: Exported::Named(exported.into()),
            local: local.into(),
        }
    }

    pub fn default(local: impl Into<String>) -> Self {
        Self {
            exported: Exported::Default,
            local: local.into(),
        }
    }

    pub fn namespace(local: impl Into<String>) -> Self {
        Self {
            exported: Exported::Namespace,
            local: local.into(),
        }
    }

    fn to_specifier(&self) -> ImportSpecifier {
        ImportSpecifier::new(self.exported.clone(), self.local.clone())
    }
}

// ============================================================================
// ADD IMPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddImport {
    pub source: String,
    /// Empty means a side-effect-only import.
    #[serde(default)]
    pub specifiers: Vec<SpecifierRequest>,
    /// Leading comment attached to a newly created declaration.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Transform for AddImport {
    fn name(&self) -> &'static str {
        "add-import"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        session.title(&format!("Add import from '{}'.", self.source));

        if self.specifiers.is_empty() {
            if has_source(session.module, &self.source) {
                session.warning(&format!(
                    "An import from '{}' is already present, side-effects are already loaded.",
                    self.source
                ));
                return Ok(());
            }
            let decl = self.new_declaration(Vec::new());
            place_declaration(session.module, decl, &self.source);
        } else {
            for request in &self.specifiers {
                if self.specifier_already_exists(session, request) {
                    continue; // Ignore when already present.
                }
                if !self.local_is_unique(session, &request.local) {
                    continue;
                }

                let specifier = request.to_specifier();
                if add_to_compatible_declaration(session.module, &self.source, specifier.clone()) {
                    continue;
                }

                let decl = self.new_declaration(vec![specifier]);
                place_declaration(session.module, decl, &self.source);
            }
        }

        ensure_blank_after_imports(session.module);
        Ok(())
    }
}

impl AddImport {
    fn specifier_already_exists(&self, session: &Session, request: &SpecifierRequest) -> bool {
        let exists = session
            .module
            .imports()
            .filter(|(_, d)| d.source == self.source)
            .flat_map(|(_, d)| d.specifiers.iter())
            .any(|s| s.exported == request.exported && s.local == request.local);

        if exists {
            session.warning(&format!(
                "Import specifier {} already exists and will be (safely) ignored.",
                request.to_specifier().describe()
            ));
        }
        exists
    }

    fn local_is_unique(&self, session: &Session, local: &str) -> bool {
        let bound = session
            .module
            .imports()
            .flat_map(|(_, d)| d.specifiers.iter())
            .any(|s| s.local == local);

        if bound {
            session.warning(&format!(
                "Import local '{}' is not unique and will be skipped. This could lead to unexpected behaviour!",
                local
            ));
            return false;
        }
        true
    }

    fn new_declaration(&self, specifiers: Vec<ImportSpecifier>) -> Stmt {
        let mut stmt = Stmt::new(
            StmtKind::Import(ImportDecl {
                source: self.source.clone(),
                specifiers,
            }),
            Span::default(),
        );
        if let Some(comment) = &self.comment {
            stmt.comments = create_comments(comment, true, true);
        }
        stmt
    }
}

/// Append the specifier to the first same-source declaration whose existing
/// specifiers all tolerate its kind. A default goes anywhere without a
/// default; a namespace only alongside a lone default; a named binding
/// anywhere without a namespace. Declarations without specifiers accept
/// anything.
fn add_to_compatible_declaration(
    module: &mut Module,
    source: &str,
    specifier: ImportSpecifier,
) -> bool {
    let compatible = module.body.iter().position(|stmt| {
        let Some(decl) = stmt.as_import() else {
            return false;
        };
        if decl.source != source {
            return false;
        }
        decl.specifiers.iter().all(|existing| match specifier.exported {
            Exported::Default => existing.exported != Exported::Default,
            Exported::Namespace => {
                !matches!(existing.exported, Exported::Named(_))
                    && existing.exported != Exported::Namespace
            }
            Exported::Named(_) => existing.exported != Exported::Namespace,
        })
    });

    match compatible {
        Some(index) => {
            let decl = module.body[index]
                .as_import_mut()
                .expect("position() matched an import");
            decl.specifiers.push(specifier);
            true
        }
        None => false,
    }
}

/// Insert a new declaration at its deterministic position:
/// start of an import-less tree; after the last same-source declaration;
/// otherwise package sources group after the last package import (or before
/// the first relative import), and relative sources go after every import.
fn place_declaration(module: &mut Module, decl: Stmt, source: &str) {
    let imports = module.import_indices();

    if imports.is_empty() {
        module.body.insert(0, decl);
        return;
    }

    if let Some(last_same) = imports
        .iter()
        .rev()
        .find(|&&i| module.body[i].as_import().map(|d| d.source.as_str()) == Some(source))
    {
        module.body.insert(last_same + 1, decl);
        return;
    }

    if source_type(source) == SourceType::Package {
        let last_package = imports.iter().rev().find(|&&i| {
            module.body[i]
                .as_import()
                .map(|d| source_type(&d.source) == SourceType::Package)
                .unwrap_or(false)
        });

        match last_package {
            Some(&index) => module.body.insert(index + 1, decl),
            None => {
                // Only relative imports exist; the package group starts
                // before the first of them.
                let first_relative = imports[0];
                module.body.insert(first_relative, decl);
            }
        }
        return;
    }

    let last = *imports.last().expect("imports is non-empty");
    module.body.insert(last + 1, decl);
}

/// Ensure exactly one blank-line sentinel follows the final import
/// declaration.
fn ensure_blank_after_imports(module: &mut Module) {
    let Some(&last) = module.import_indices().last() else {
        return;
    };

    let mut next = last + 1;
    if module.body.get(next).map(|s| s.is_blank()).unwrap_or(false) {
        next += 1;
        while module.body.get(next).map(|s| s.is_blank()).unwrap_or(false) {
            module.body.remove(next);
        }
    } else {
        module.body.insert(next, Stmt::blank());
    }
}

fn has_source(module: &Module, source: &str) -> bool {
    module.imports().any(|(_, d)| d.source == source)
}

// ============================================================================
// REMOVE IMPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveImport {
    pub source: String,
    /// Empty means: remove every declaration for the source outright.
    #[serde(default)]
    pub specifiers: Vec<SpecifierRequest>,
    /// Keep a (possibly empty) declaration alive for its load side effects.
    #[serde(default)]
    pub keep_source_for_side_effects: bool,
}

impl Transform for RemoveImport {
    fn name(&self) -> &'static str {
        "remove-import"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        session.title(&format!("Remove import from '{}'.", self.source));

        if self.specifiers.is_empty() {
            if self.keep_source_for_side_effects {
                return Ok(());
            }
            session
                .module
                .body
                .retain(|s| s.as_import().map(|d| d.source != self.source).unwrap_or(true));
            return Ok(());
        }

        for stmt in session.module.body.iter_mut() {
            let Some(decl) = stmt.as_import_mut() else {
                continue;
            };
            if decl.source != self.source {
                continue;
            }
            decl.specifiers.retain(|existing| {
                !self
                    .specifiers
                    .iter()
                    .any(|r| r.exported == existing.exported && r.local == existing.local)
            });
        }

        if !self.keep_source_for_side_effects {
            session.module.body.retain(|s| {
                s.as_import()
                    .map(|d| d.source != self.source || !d.specifiers.is_empty())
                    .unwrap_or(true)
            });
        }

        Ok(())
    }
}
